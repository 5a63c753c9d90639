use tracing::{debug, info};

use crate::analysis::Subscriber;
use crate::config::TbConfig;
use crate::error::TbResult;
use crate::gcd::coverage::GcdCoverage;
use crate::gcd::driver::{DriverConfig, DriverStats, GcdDriver};
use crate::gcd::interface::GcdIo;
use crate::gcd::monitor::{GcdMonitor, MonitorStats};
use crate::gcd::scoreboard::GcdScoreboard;
use crate::gcd::transaction::GcdTransaction;
use crate::sequencer::Sequencer;
use crate::signal::SimObject;
use crate::tb_obj::TbObj;
use crate::testbench::Report;

/// Agent, checkers and their wiring for one GCD instance.
///
/// The driver's port feeds the scoreboard, then coverage. The monitor's port has no subscriber
/// unless one is added with [`GcdEnv::connect_monitor`].
pub struct GcdEnv {
    dut: SimObject,
    pub sequencer: Sequencer<GcdTransaction>,
    driver: Option<GcdDriver>,
    monitor: Option<GcdMonitor>,
    pub scoreboard: TbObj<GcdScoreboard>,
    pub coverage: TbObj<GcdCoverage>,
    pub driver_stats: TbObj<DriverStats>,
    pub monitor_stats: TbObj<MonitorStats>,
}

impl GcdEnv {
    pub fn build(dut: &SimObject, cfg: &TbConfig) -> TbResult<Self> {
        let io = GcdIo::bind(dut)?;
        let sequencer = Sequencer::new("sequencer");
        let mut driver =
            GcdDriver::new(io.clone(), sequencer.seq_item_port()?, DriverConfig::from(cfg));
        let monitor = GcdMonitor::new(io, cfg.result_timeout_cycles);

        let scoreboard = TbObj::new(GcdScoreboard::new());
        let coverage = TbObj::new(GcdCoverage::new());
        driver.ap.connect(&scoreboard);
        driver.ap.connect(&coverage);

        Ok(Self {
            dut: dut.clone(),
            sequencer,
            driver_stats: driver.stats(),
            monitor_stats: monitor.stats(),
            driver: Some(driver),
            monitor: Some(monitor),
            scoreboard,
            coverage,
        })
    }

    /// Binds `subscriber` to the monitor's port. Has no effect once the env is started.
    pub fn connect_monitor<S>(&mut self, subscriber: &TbObj<S>)
    where
        S: Subscriber<GcdTransaction> + 'static,
    {
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.ap.connect(subscriber);
        }
    }

    /// Spawns the driver and monitor loops. They run until the test tears the simulation down.
    pub fn start(&mut self) {
        let sim = self.dut.sim();
        if let Some(driver) = self.driver.take() {
            sim.spawn("driver", driver.run());
        }
        if let Some(monitor) = self.monitor.take() {
            sim.spawn("monitor", monitor.run());
        }
        debug!(dut = self.dut.name(), "env started");
    }

    /// Runs every report hook. Returns the scoreboard's verdict.
    pub fn report(&self) -> TbResult<()> {
        let drv = self.driver_stats.get();
        let mon = self.monitor_stats.get();
        info!(
            driven = drv.driven,
            timed_out = drv.timed_out,
            stale_overruns = drv.stale_overruns,
            observed = mon.observed,
            missed = mon.missed,
            "agent statistics"
        );
        self.coverage.get().report_phase()?;
        self.scoreboard.get().report_phase()
    }
}
