use num_format::{Locale, ToFormattedString};
use prettytable::{format, Cell, Row, Table};
use tracing::{error, info, warn};

use crate::analysis::Subscriber;
use crate::error::{TbError, TbResult};
use crate::gcd::transaction::GcdTransaction;
use crate::testbench::Report;

/// Euclid's algorithm. `gcd(a, 0) == a`, `gcd(0, 0) == 0`.
pub fn reference_gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Checks every received transaction against [`reference_gcd`].
#[derive(Debug, Default)]
pub struct GcdScoreboard {
    passed: u64,
    failed: u64,
}

impl GcdScoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passed(&self) -> u64 {
        self.passed
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn total(&self) -> u64 {
        self.passed + self.failed
    }

    /// Percentage of passing transactions, `None` before the first one.
    pub fn pass_rate(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            n => Some(self.passed as f64 * 100.0 / n as f64),
        }
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(Row::new(vec![Cell::new("scoreboard"), Cell::new("count")]));
        let rows = [("passed", self.passed), ("failed", self.failed), ("total", self.total())];
        for (name, n) in rows {
            table.add_row(Row::new(vec![
                Cell::new(name),
                Cell::new(&n.to_formatted_string(&Locale::en)),
            ]));
        }
        table
    }
}

impl Subscriber<GcdTransaction> for GcdScoreboard {
    fn receive(&mut self, txn: &GcdTransaction) {
        let expected = reference_gcd(txn.value1, txn.value2);
        if txn.output_valid && txn.output_gcd == expected {
            self.passed += 1;
        } else {
            self.failed += 1;
            error!(
                "mismatch for {}: expected gcd {}, got {} (valid={})",
                txn.name, expected, txn.output_gcd, txn.output_valid
            );
        }
    }
}

impl Report for GcdScoreboard {
    fn report_name(&self) -> &str {
        "scoreboard"
    }

    fn report_phase(&self) -> TbResult<()> {
        let Some(rate) = self.pass_rate() else {
            warn!("scoreboard received no transactions");
            return Ok(());
        };
        info!("\n{}", self.table());
        info!("pass rate: {:.2}%", rate);
        if self.failed > 0 {
            return Err(TbError::ScoreboardMismatch {
                failed: self.failed,
                total: self.total(),
            });
        }
        Ok(())
    }
}
