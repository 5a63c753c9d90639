use tracing::{debug, error, info, warn};

use crate::analysis::AnalysisPort;
use crate::config::TbConfig;
use crate::error::TbResult;
use crate::gcd::interface::GcdIo;
use crate::gcd::transaction::GcdTransaction;
use crate::sequencer::SeqItemPort;
use crate::tb_obj::TbObj;
use crate::utils::clock_cycles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    pub reset_cycles: u32,
    pub stale_valid_bound: u32,
    pub result_timeout_cycles: u32,
}

impl From<&TbConfig> for DriverConfig {
    fn from(cfg: &TbConfig) -> Self {
        Self {
            reset_cycles: cfg.reset_cycles,
            stale_valid_bound: cfg.stale_valid_bound,
            result_timeout_cycles: cfg.result_timeout_cycles,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DriverStats {
    pub driven: u64,
    pub completed: u64,
    pub timed_out: u64,
    /// Transactions where result-valid from the previous computation outlived the drain bound.
    pub stale_overruns: u64,
    pub total_cycles: u64,
    pub last_wait_cycles: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Completed { cycles: u32 },
    TimedOut { cycles: u32 },
}

/// Converts sequence items into pin activity and reports each finished item on `ap`.
pub struct GcdDriver {
    io: GcdIo,
    port: SeqItemPort<GcdTransaction>,
    cfg: DriverConfig,
    pub ap: AnalysisPort<GcdTransaction>,
    stats: TbObj<DriverStats>,
}

impl GcdDriver {
    pub fn new(io: GcdIo, port: SeqItemPort<GcdTransaction>, cfg: DriverConfig) -> Self {
        Self {
            io,
            port,
            cfg,
            ap: AnalysisPort::new("driver_ap"),
            stats: TbObj::default(),
        }
    }

    /// Shared view of the counters, still readable after `run` took the driver.
    pub fn stats(&self) -> TbObj<DriverStats> {
        self.stats.clone()
    }

    /// Resets the design, then serves items until the sequencer goes away.
    pub async fn run(mut self) -> TbResult<()> {
        self.reset().await;
        loop {
            let mut txn = self.port.get_next_item().await?;
            self.drive_transaction(&mut txn).await;
            // published even on timeout, the checkers count it as a failure
            self.ap.publish(&txn);
            self.port.item_done()?;
        }
    }

    fn now_ns(&self) -> f64 {
        self.io.clock.sim().time_ns()
    }

    pub async fn reset(&self) {
        info!(t_ns = self.now_ns(), cycles = self.cfg.reset_cycles, "resetting design");
        self.io.reset.set_bool(true);
        self.io.loading_values.set_bool(false);
        self.io.value1.set_u32(0);
        self.io.value2.set_u32(0);
        clock_cycles(&self.io.clock, self.cfg.reset_cycles).await;
        self.io.reset.set_bool(false);
        self.io.clock.rising_edge().await;
        debug!(t_ns = self.now_ns(), "reset released");
    }

    /// Loads the operands and waits for the result. On timeout the result fields stay untouched.
    pub async fn drive_transaction(&self, txn: &mut GcdTransaction) -> WaitOutcome {
        let io = &self.io;
        debug!(t_ns = self.now_ns(), %txn, "driving");
        io.loading_values.set_bool(true);
        io.value1.set_u32(txn.value1);
        io.value2.set_u32(txn.value2);
        io.clock.rising_edge().await;
        io.loading_values.set_bool(false);

        self.drain_stale_valid(txn).await;

        let outcome = self.wait_for_result().await;
        let mut stats = self.stats.get_mut();
        stats.driven += 1;
        match outcome {
            WaitOutcome::Completed { cycles } => {
                txn.output_gcd = io.output_gcd.u32();
                txn.output_valid = true;
                stats.completed += 1;
                stats.total_cycles += cycles as u64;
                stats.last_wait_cycles = cycles;
                debug!(t_ns = self.now_ns(), %txn, cycles, "completed");
            }
            WaitOutcome::TimedOut { cycles } => {
                stats.timed_out += 1;
                stats.total_cycles += cycles as u64;
                stats.last_wait_cycles = cycles;
                error!(
                    t_ns = self.now_ns(),
                    "timeout waiting for result of {} after {} cycles",
                    txn.name, cycles
                );
            }
        }
        outcome
    }

    async fn drain_stale_valid(&self, txn: &GcdTransaction) {
        let mut waited = 0;
        while self.io.output_valid.is_high() && waited < self.cfg.stale_valid_bound {
            self.io.clock.rising_edge().await;
            waited += 1;
        }
        if self.io.output_valid.is_high() {
            self.stats.get_mut().stale_overruns += 1;
            warn!(
                t_ns = self.now_ns(),
                "result valid still high {} cycles after loading {}, proceeding",
                waited, txn.name
            );
        }
    }

    async fn wait_for_result(&self) -> WaitOutcome {
        let io = &self.io;
        if io.output_valid.is_high() {
            return WaitOutcome::Completed { cycles: 0 };
        }
        for cycles in 1..=self.cfg.result_timeout_cycles {
            io.clock.rising_edge().await;
            if io.output_valid.is_high() {
                return WaitOutcome::Completed { cycles };
            }
        }
        WaitOutcome::TimedOut {
            cycles: self.cfg.result_timeout_cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Subscriber;
    use crate::design::{Design, DesignIo, Port};
    use crate::error::TbError;
    use crate::gcd::model::gcd_ports;
    use crate::gcd::scoreboard::reference_gcd;
    use crate::gcd::sequences::VectorSequence;
    use crate::kernel::Kernel;
    use crate::sequencer::Sequencer;
    use crate::sim_if::Sim;
    use crate::testbench::clock;

    const LOAD: usize = 2;
    const V1: usize = 3;
    const V2: usize = 4;
    const GCD: usize = 5;
    const VALID: usize = 6;

    // never raises result-valid
    struct Stuck;

    impl Design for Stuck {
        fn name(&self) -> &str {
            "gcd"
        }
        fn ports(&self) -> Vec<Port> {
            gcd_ports(16)
        }
        fn clock_port(&self) -> usize {
            0
        }
        fn on_rising_edge(&mut self, _io: &mut DesignIo<'_>) {}
    }

    // keeps the previous (bogus) result valid for two edges after a load, then answers
    #[derive(Default)]
    struct Lingering {
        x: u64,
        y: u64,
        since_load: Option<u32>,
    }

    impl Design for Lingering {
        fn name(&self) -> &str {
            "gcd"
        }
        fn ports(&self) -> Vec<Port> {
            gcd_ports(16)
        }
        fn clock_port(&self) -> usize {
            0
        }
        fn on_rising_edge(&mut self, io: &mut DesignIo<'_>) {
            if io.is_high(LOAD) {
                self.x = io.get(V1);
                self.y = io.get(V2);
                self.since_load = Some(0);
            } else if let Some(n) = self.since_load {
                self.since_load = Some(n + 1);
            }
            match self.since_load {
                None => io.set(VALID, 0),
                Some(0) | Some(1) => {
                    io.set(GCD, 999);
                    io.set(VALID, 1);
                }
                Some(2) => io.set(VALID, 0),
                Some(_) => {
                    io.set(GCD, reference_gcd(self.x as u32, self.y as u32) as u64);
                    io.set(VALID, 1);
                }
            }
        }
    }

    struct Recorder {
        sim: Sim,
        seen: Vec<(GcdTransaction, f64)>,
    }

    impl Subscriber<GcdTransaction> for Recorder {
        fn receive(&mut self, item: &GcdTransaction) {
            self.seen.push((item.clone(), self.sim.time_ns()));
        }
    }

    fn drive_one(
        design: Box<dyn Design>,
        cfg: DriverConfig,
        pair: (u32, u32),
    ) -> (TbObj<Recorder>, TbObj<DriverStats>) {
        let kernel = Kernel::new(design, 100);
        let sim = kernel.sim();
        let io = GcdIo::bind(&sim.root()).unwrap();
        sim.spawn("clock", clock(io.clock.clone(), 10, "ns"));

        let sequencer = Sequencer::new("seqr");
        let mut driver = GcdDriver::new(io, sequencer.seq_item_port().unwrap(), cfg);
        let recorder = TbObj::new(Recorder {
            sim: sim.clone(),
            seen: Vec::new(),
        });
        driver.ap.connect(&recorder);
        let stats = driver.stats();
        sim.spawn("driver", driver.run());

        let mut seq = sim.spawn("seq", async move {
            let mut seq = VectorSequence::new("one", &[pair]);
            sequencer.start(&mut seq).await
        });
        let driven = kernel.run_until(&mut seq, 1_000_000).unwrap().unwrap();
        assert_eq!(driven, 1);
        kernel.tear_down();
        (recorder, stats)
    }

    fn cfg(stale_valid_bound: u32) -> DriverConfig {
        DriverConfig {
            reset_cycles: 5,
            stale_valid_bound,
            result_timeout_cycles: 1000,
        }
    }

    #[test]
    fn stuck_design_times_out_and_is_still_published() {
        let (recorder, stats) = drive_one(Box::new(Stuck), cfg(10), (12, 8));
        let rec = recorder.get();
        assert_eq!(rec.seen.len(), 1);
        let (txn, time_ns) = &rec.seen[0];
        assert!(!txn.output_valid);
        assert_eq!(txn.output_gcd, 0);
        assert_eq!((txn.value1, txn.value2), (12, 8));
        // loaded on the 7th rising edge, 1000 more edges until the timeout
        assert_eq!(*time_ns, 10_065.0);
        assert_eq!(stats.get().timed_out, 1);
        assert_eq!(stats.get().completed, 0);
    }

    #[test]
    fn stale_valid_is_drained_before_waiting() {
        let (recorder, stats) = drive_one(Box::<Lingering>::default(), cfg(10), (12, 8));
        let rec = recorder.get();
        let (txn, _) = &rec.seen[0];
        assert!(txn.output_valid);
        assert_eq!(txn.output_gcd, 4);
        assert_eq!(stats.get().stale_overruns, 0);
        assert_eq!(stats.get().total_cycles, 1);
    }

    #[test]
    fn drain_gives_up_after_its_bound() {
        let (recorder, stats) = drive_one(Box::<Lingering>::default(), cfg(1), (12, 8));
        let rec = recorder.get();
        let (txn, _) = &rec.seen[0];
        assert_eq!(txn.output_gcd, 999);
        assert_eq!(stats.get().stale_overruns, 1);
    }

    #[test]
    fn driver_fails_once_its_sequencer_is_gone() {
        let kernel = Kernel::new(Box::new(Stuck), 100);
        let sim = kernel.sim();
        let io = GcdIo::bind(&sim.root()).unwrap();
        sim.spawn("clock", clock(io.clock.clone(), 10, "ns"));
        let sequencer: Sequencer<GcdTransaction> = Sequencer::new("seqr");
        let port = sequencer.seq_item_port().unwrap();
        drop(sequencer);
        let mut drv = sim.spawn("driver", GcdDriver::new(io, port, cfg(10)).run());
        let err = kernel.run_until(&mut drv, 1_000).unwrap().unwrap_err();
        assert!(matches!(err, TbError::SequencerClosed(_)));
    }
}
