use num_format::{Locale, ToFormattedString};
use prettytable::{format, Cell, Row, Table};
use std::fmt;
use tracing::info;

use crate::analysis::Subscriber;
use crate::error::TbResult;
use crate::gcd::transaction::GcdTransaction;
use crate::testbench::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverageBin {
    Zero,
    Unity,
    Equal,
    Coprime,
    MaxValue,
    PowerOfTwo,
}

impl CoverageBin {
    pub const ALL: [CoverageBin; 6] = [
        CoverageBin::Zero,
        CoverageBin::Unity,
        CoverageBin::Equal,
        CoverageBin::Coprime,
        CoverageBin::MaxValue,
        CoverageBin::PowerOfTwo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageBin::Zero => "zero_cases",
            CoverageBin::Unity => "one_cases",
            CoverageBin::Equal => "equal_cases",
            CoverageBin::Coprime => "coprime_cases",
            CoverageBin::MaxValue => "max_value_cases",
            CoverageBin::PowerOfTwo => "power_of_two_cases",
        }
    }

    /// Bins overlap, one transaction may hit several.
    pub fn hit(&self, txn: &GcdTransaction) -> bool {
        let (a, b) = (txn.value1, txn.value2);
        match self {
            CoverageBin::Zero => a == 0 || b == 0,
            CoverageBin::Unity => a == 1 || b == 1,
            CoverageBin::Equal => a == b,
            // judged on what the design answered
            CoverageBin::Coprime => txn.output_gcd == 1,
            CoverageBin::MaxValue => {
                a == GcdTransaction::MAX_VALUE || b == GcdTransaction::MAX_VALUE
            }
            CoverageBin::PowerOfTwo => is_power_of_two(a) || is_power_of_two(b),
        }
    }
}

impl fmt::Display for CoverageBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_power_of_two(n: u32) -> bool {
    n > 0 && n & (n - 1) == 0
}

#[derive(Debug, Default)]
pub struct GcdCoverage {
    total: u64,
    hits: [u64; CoverageBin::ALL.len()],
}

impl GcdCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn count(&self, bin: CoverageBin) -> u64 {
        self.hits[bin as usize]
    }

    pub fn bins(&self) -> impl Iterator<Item = (CoverageBin, u64)> + '_ {
        CoverageBin::ALL.into_iter().map(|bin| (bin, self.count(bin)))
    }
}

impl Subscriber<GcdTransaction> for GcdCoverage {
    fn receive(&mut self, txn: &GcdTransaction) {
        self.total += 1;
        for bin in CoverageBin::ALL {
            if bin.hit(txn) {
                self.hits[bin as usize] += 1;
            }
        }
    }
}

impl Report for GcdCoverage {
    fn report_name(&self) -> &str {
        "coverage"
    }

    fn report_phase(&self) -> TbResult<()> {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(Row::new(vec![Cell::new("bin"), Cell::new("hits")]));
        table.add_row(Row::new(vec![
            Cell::new("total_transactions"),
            Cell::new(&self.total.to_formatted_string(&Locale::en)),
        ]));
        for (bin, n) in self.bins() {
            table.add_row(Row::new(vec![
                Cell::new(bin.as_str()),
                Cell::new(&n.to_formatted_string(&Locale::en)),
            ]));
        }
        info!("coverage\n{}", table);
        Ok(())
    }
}
