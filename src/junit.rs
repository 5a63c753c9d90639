use junit_report::{Duration, ReportBuilder, TestCaseBuilder, TestSuiteBuilder};
use std::fs;
use std::path::Path;

use crate::error::{TbError, TbResult};
use crate::test::RunSummary;

pub fn write_junit(summary: &RunSummary, suite: &str, path: &Path) -> TbResult<()> {
    let mut test_cases = Vec::new();
    for r in &summary.records {
        let duration = Duration::seconds_f64(r.wall_secs);
        let tc = match &r.result {
            Ok(_) => TestCaseBuilder::success(&r.name, duration),
            Err(msg) => TestCaseBuilder::failure(&r.name, duration, "failure", msg),
        }
        .set_system_out(&format!("simulated {} ns", r.sim_time_ns))
        .build();
        test_cases.push(tc);
    }

    let test_suite = TestSuiteBuilder::new(suite).add_testcases(test_cases).build();
    let report = ReportBuilder::new().add_testsuite(test_suite).build();

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file = fs::File::create(path)?;
    report.write_xml(file).map_err(|e| TbError::Junit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestRecord;

    fn record(name: &str, result: Result<String, String>) -> TestRecord {
        TestRecord {
            name: name.to_string(),
            result,
            wall_secs: 0.25,
            sim_time_ns: 1500.0,
        }
    }

    #[test]
    fn writes_one_case_per_test() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("results.xml");
        let summary = RunSummary {
            records: vec![
                record("directed", Ok("9 transactions passed".into())),
                record("random", Err("scoreboard: 2 of 100 transaction(s) failed".into())),
            ],
            wall_secs: 0.5,
        };
        write_junit(&summary, "tlmtb", &path).unwrap();

        let xml = fs::read_to_string(&path).unwrap();
        assert!(xml.contains("testsuite"));
        assert!(xml.contains("name=\"directed\""));
        assert!(xml.contains("name=\"random\""));
        assert!(xml.contains("<failure"));
        assert!(xml.contains("2 of 100"));
    }
}
