use tracing::warn;

use crate::error::TbResult;
use crate::signal::Signal;

/// End-of-run hook of a reporting component (scoreboard, coverage collector).
///
/// `report_phase` logs the component's totals. Only a checking component returns an error, and
/// only to signal that the run as a whole failed.
pub trait Report {
    fn report_name(&self) -> &str;
    fn report_phase(&self) -> TbResult<()>;
}

/*
 * CLOCK
 */
pub async fn clock(clk: Signal, period: u64, unit: &str) -> TbResult<()> {
    let high_t = period / 2;
    let low_t = period - high_t;
    if period % 2 != 0 {
        warn!(
            "Clock period {period}{unit} not dividable by 2. \
             High time will be {high}{unit}; low time will be {low}{unit}.",
            period = period,
            unit = unit,
            high = high_t,
            low = low_t
        );
    }
    let sim = clk.sim().clone();
    loop {
        clk.set_bool(false);
        sim.timer(low_t, unit)?.await;
        clk.set_bool(true);
        sim.timer(high_t, unit)?.await;
    }
}
