use tracing::{debug, warn};

use crate::analysis::AnalysisPort;
use crate::gcd::interface::GcdIo;
use crate::gcd::transaction::GcdTransaction;
use crate::tb_obj::TbObj;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MonitorStats {
    pub observed: u64,
    /// Loads whose result never became valid. Those are not published.
    pub missed: u64,
}

/// Passive observer: rebuilds transactions from the pins alone.
pub struct GcdMonitor {
    io: GcdIo,
    result_timeout_cycles: u32,
    pub ap: AnalysisPort<GcdTransaction>,
    stats: TbObj<MonitorStats>,
}

impl GcdMonitor {
    pub fn new(io: GcdIo, result_timeout_cycles: u32) -> Self {
        Self {
            io,
            result_timeout_cycles,
            ap: AnalysisPort::new("monitor_ap"),
            stats: TbObj::default(),
        }
    }

    pub fn stats(&self) -> TbObj<MonitorStats> {
        self.stats.clone()
    }

    pub async fn run(self) {
        let io = &self.io;
        loop {
            io.clock.rising_edge().await;
            if !io.loading_values.is_high() {
                continue;
            }
            let mut txn = GcdTransaction::new("monitored_txn");
            txn.value1 = io.value1.u32();
            txn.value2 = io.value2.u32();
            txn.loading_values = true;

            if self.wait_for_result().await {
                txn.output_gcd = io.output_gcd.u32();
                txn.output_valid = true;
                self.stats.get_mut().observed += 1;
                debug!(t_ns = io.clock.sim().time_ns(), %txn, "observed");
                self.ap.publish(&txn);
            } else {
                self.stats.get_mut().missed += 1;
                warn!(
                    t_ns = io.clock.sim().time_ns(),
                    "monitor: no result for value1={} value2={} within {} cycles",
                    txn.value1, txn.value2, self.result_timeout_cycles
                );
            }
        }
    }

    // true once result-valid is seen, checked on the load edge and up to the bound after it
    async fn wait_for_result(&self) -> bool {
        if self.io.output_valid.is_high() {
            return true;
        }
        for _ in 0..self.result_timeout_cycles {
            self.io.clock.rising_edge().await;
            if self.io.output_valid.is_high() {
                return true;
            }
        }
        false
    }
}
