use futures::future::LocalBoxFuture;
use num_format::{Locale, ToFormattedString};
use prettytable::{format, Cell, Row, Table};
use std::fmt;
use std::rc::Rc;
use std::time::Instant;
use tracing::{error, info};

use crate::config::TbConfig;
use crate::design::Design;
use crate::error::{TbError, TbResult};
use crate::junit;
use crate::kernel::Kernel;
use crate::sim_if::Sim;

pub type DesignFactory = Rc<dyn Fn() -> Box<dyn Design>>;
pub type TestBody = Box<dyn Fn(Sim, TbConfig) -> LocalBoxFuture<'static, TbResult<String>>>;

/// A named test: the design it runs against and the body driving it.
pub struct Test {
    pub name: String,
    pub description: String,
    design: DesignFactory,
    body: TestBody,
}

impl Test {
    pub fn new<F>(name: &str, description: &str, design: DesignFactory, body: F) -> Self
    where
        F: Fn(Sim, TbConfig) -> LocalBoxFuture<'static, TbResult<String>> + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            design,
            body: Box::new(body),
        }
    }
}

impl fmt::Debug for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Test")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct TestRegistry(Vec<Test>);

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, test: Test) {
        self.0.push(test);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<Test> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> TbResult<&Test> {
        self.0
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| TbError::UnknownTest(name.to_string()))
    }

    /// Tests named in `names`, in that order. No names selects every test.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> TbResult<Vec<&Test>> {
        if names.is_empty() {
            return Ok(self.0.iter().collect());
        }
        names.iter().map(|n| self.get(n.as_ref())).collect()
    }
}

#[derive(Debug, Clone)]
pub struct TestRecord {
    pub name: String,
    /// Pass message or failure reason.
    pub result: Result<String, String>,
    pub wall_secs: f64,
    pub sim_time_ns: f64,
}

impl TestRecord {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }

    fn sim_speed(&self) -> f64 {
        if self.wall_secs > 0.0 {
            self.sim_time_ns / self.wall_secs
        } else {
            0.0
        }
    }
}

/// Runs one test on a fresh kernel and tears it down afterwards.
pub fn run_test(test: &Test, cfg: &TbConfig) -> TestRecord {
    let start = Instant::now();
    let kernel = Kernel::new((test.design)(), cfg.delta_limit);
    let sim = kernel.sim();
    info!(test = test.name.as_str(), "{}", test.description);

    let mut handle = sim.spawn(&test.name, (test.body)(sim.clone(), cfg.clone()));
    let result = kernel
        .run_until(&mut handle, cfg.max_sim_time_ns)
        .and_then(|r| r)
        .map_err(|e| e.to_string());
    let sim_time_ns = sim.time_ns();
    kernel.tear_down();

    match &result {
        Ok(msg) => info!(test = test.name.as_str(), sim_time_ns, "passed: {}", msg),
        Err(msg) => error!(test = test.name.as_str(), sim_time_ns, "failed: {}", msg),
    }
    TestRecord {
        name: test.name.clone(),
        result,
        wall_secs: start.elapsed().as_secs_f64(),
        sim_time_ns,
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub records: Vec<TestRecord>,
    pub wall_secs: f64,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        self.records.iter().all(TestRecord::passed)
    }

    pub fn failed(&self) -> usize {
        self.records.iter().filter(|r| !r.passed()).count()
    }

    pub fn sim_time_ns(&self) -> f64 {
        self.records.iter().map(|r| r.sim_time_ns).sum()
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(Row::new(
            ["test", "result", "time (s)", "sim time (ns)", "sim speed (ns/s)"]
                .iter()
                .map(|h| Cell::new(h))
                .collect(),
        ));
        for r in &self.records {
            table.add_row(Row::new(vec![
                Cell::new(&r.name),
                Cell::new(if r.passed() { "passed" } else { "failed" }),
                Cell::new(&format!("{:.3}", r.wall_secs)),
                Cell::new(&(r.sim_time_ns as u64).to_formatted_string(&Locale::en)),
                Cell::new(&(r.sim_speed() as u64).to_formatted_string(&Locale::en)),
            ]));
        }
        table
    }
}

/// Runs `tests` in order and logs a summary. Writes a JUnit file when `cfg.junit_path` is set.
pub fn run_tests(tests: &[&Test], cfg: &TbConfig) -> TbResult<RunSummary> {
    let start = Instant::now();
    let records = tests.iter().map(|t| run_test(t, cfg)).collect();
    let summary = RunSummary {
        records,
        wall_secs: start.elapsed().as_secs_f64(),
    };

    info!("\n{}", summary.table());
    info!(
        "{} of {} test(s) passed, simulated {} ns in {:.3} s",
        summary.records.len() - summary.failed(),
        summary.records.len(),
        (summary.sim_time_ns() as u64).to_formatted_string(&Locale::en),
        summary.wall_secs
    );

    if let Some(path) = &cfg.junit_path {
        junit::write_junit(&summary, env!("CARGO_PKG_NAME"), path)?;
        info!("junit report written to {}", path.display());
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{DesignIo, Port};
    use futures::FutureExt;

    struct Idle;

    impl Design for Idle {
        fn name(&self) -> &str {
            "idle"
        }
        fn ports(&self) -> Vec<Port> {
            vec![Port::input("clk", 1)]
        }
        fn clock_port(&self) -> usize {
            0
        }
        fn on_rising_edge(&mut self, _io: &mut DesignIo<'_>) {}
    }

    fn idle() -> DesignFactory {
        Rc::new(|| Box::new(Idle) as Box<dyn Design>)
    }

    fn registry() -> TestRegistry {
        let mut reg = TestRegistry::new();
        reg.register(Test::new("waits", "advances 5 ns", idle(), |sim, _| {
            async move {
                sim.timer(5, "ns")?.await;
                TbResult::Ok("done".to_string())
            }
            .boxed_local()
        }));
        reg.register(Test::new("hangs", "waits for an edge that never comes", idle(), |sim, _| {
            async move {
                let clk = sim.root().signal("clk")?;
                clk.rising_edge().await;
                TbResult::Ok(String::new())
            }
            .boxed_local()
        }));
        reg
    }

    #[test]
    fn selection_keeps_requested_order() {
        let reg = registry();
        let picked = reg.select(&["hangs", "waits"]).unwrap();
        assert_eq!(picked[0].name, "hangs");
        assert_eq!(reg.select::<&str>(&[]).unwrap().len(), 2);
        assert!(matches!(reg.select(&["nope"]), Err(TbError::UnknownTest(_))));
    }

    #[test]
    fn passing_test_records_sim_time() {
        let reg = registry();
        let rec = run_test(reg.get("waits").unwrap(), &TbConfig::default());
        assert_eq!(rec.result, Ok("done".to_string()));
        assert_eq!(rec.sim_time_ns, 5.0);
    }

    #[test]
    fn stalled_test_fails() {
        let reg = registry();
        let rec = run_test(reg.get("hangs").unwrap(), &TbConfig::default());
        assert!(!rec.passed());
        assert!(rec.result.unwrap_err().contains("stalled"));
    }

    #[test]
    fn summary_fails_if_any_test_failed() {
        let reg = registry();
        let tests = reg.select::<&str>(&[]).unwrap();
        let summary = run_tests(&tests, &TbConfig::default()).unwrap();
        assert_eq!(summary.records.len(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.passed());
    }
}
