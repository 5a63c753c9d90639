use futures::FutureExt;
use std::rc::Rc;
use tracing::info;

use crate::config::TbConfig;
use crate::design::Design;
use crate::error::TbResult;
use crate::gcd::env::GcdEnv;
use crate::gcd::model::{self, GcdModel};
use crate::gcd::sequences::SequenceKind;
use crate::objection::Objection;
use crate::sim_if::Sim;
use crate::test::{DesignFactory, Test, TestRegistry};
use crate::testbench::clock;
use crate::utils::{clock_cycles, seeded_rng};

/// One sequence of a test, `count` is ignored by the literal policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceStep {
    pub kind: SequenceKind,
    pub count: usize,
}

impl SequenceStep {
    pub fn new(kind: SequenceKind, count: usize) -> Self {
        Self { kind, count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPlan {
    pub steps: Vec<SequenceStep>,
    pub drain_cycles: u32,
}

type PlanFn = fn(&TbConfig) -> TestPlan;

fn single(kind: SequenceKind, count: usize, cfg: &TbConfig) -> TestPlan {
    TestPlan {
        steps: vec![SequenceStep::new(kind, count)],
        drain_cycles: cfg.drain_cycles,
    }
}

fn random_plan(cfg: &TbConfig) -> TestPlan {
    single(SequenceKind::Random, cfg.random_txns, cfg)
}

fn directed_plan(cfg: &TbConfig) -> TestPlan {
    single(SequenceKind::Directed, 0, cfg)
}

fn corner_case_plan(cfg: &TbConfig) -> TestPlan {
    single(SequenceKind::CornerCase, 0, cfg)
}

fn back_to_back_plan(cfg: &TbConfig) -> TestPlan {
    single(SequenceKind::BackToBack, cfg.back_to_back_txns, cfg)
}

fn full_plan(cfg: &TbConfig) -> TestPlan {
    TestPlan {
        steps: vec![
            SequenceStep::new(SequenceKind::Directed, 0),
            SequenceStep::new(SequenceKind::CornerCase, 0),
            SequenceStep::new(SequenceKind::Random, cfg.full_random_txns),
            SequenceStep::new(SequenceKind::BackToBack, cfg.back_to_back_txns),
        ],
        drain_cycles: cfg.full_drain_cycles,
    }
}

const PLANS: [(&str, &str, PlanFn); 5] = [
    ("random", "random operands drawn from the tiered distribution", random_plan),
    ("directed", "literal operand pairs with known results", directed_plan),
    ("corner_case", "boundary magnitudes and small primes", corner_case_plan),
    ("back_to_back", "consecutive loads alternating quick and full draws", back_to_back_plan),
    ("full", "directed, corner case, random and back to back in one run", full_plan),
];

/// The GCD tests against the behavioural model.
pub fn registry() -> TestRegistry {
    registry_for(Rc::new(|| Box::new(GcdModel::new()) as Box<dyn Design>))
}

/// The GCD tests against another implementation of the same ports.
pub fn registry_for(design: DesignFactory) -> TestRegistry {
    let mut reg = TestRegistry::new();
    for (name, description, plan) in PLANS {
        reg.register(Test::new(name, description, design.clone(), move |sim, cfg| {
            let plan = plan(&cfg);
            run_plan(sim, cfg, plan).boxed_local()
        }));
    }
    reg
}

/// Clock, env, run phase gated by an objection, then the report phase.
pub async fn run_plan(sim: Sim, cfg: TbConfig, plan: TestPlan) -> TbResult<String> {
    let dut = sim.root();
    let clk = dut.signal(model::CLOCK)?;
    sim.spawn("clock", clock(clk.clone(), cfg.clock_period_ns, "ns"));

    let mut env = GcdEnv::build(&dut, &cfg)?;
    env.start();

    let objection = Objection::new("run_phase");
    let guard = objection.raise("test");
    let sequencer = env.sequencer.clone();
    let run_sim = sim.clone();
    let (seed, startup_delay_ns) = (cfg.seed, cfg.startup_delay_ns);
    let run = sim.spawn("run_phase", async move {
        let _guard = guard;
        run_sim.timer(startup_delay_ns, "ns")?.await;
        let phases = plan.steps.len();
        for (i, step) in plan.steps.iter().enumerate() {
            info!(phase = i + 1, phases, sequence = %step.kind, "starting sequence");
            let mut seq = step.kind.build(step.count, seeded_rng(seed, i as u64));
            let n = sequencer.start(seq.as_mut()).await?;
            info!(phase = i + 1, sequence = %step.kind, items = n, "sequence done");
        }
        clock_cycles(&clk, plan.drain_cycles).await;
        TbResult::Ok(())
    });

    objection.all_dropped().await;
    run.await??;

    env.report()?;
    let passed = env.scoreboard.get().passed();
    Ok(format!("{} transaction(s) passed", passed))
}
