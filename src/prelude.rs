pub use crate::analysis::{AnalysisPort, Subscriber};
pub use crate::config::TbConfig;
pub use crate::design::{Design, DesignIo, Port};
pub use crate::error::{TbError, TbResult};
pub use crate::executor::JoinHandle;
pub use crate::kernel::Kernel;
pub use crate::objection::Objection;
pub use crate::sequencer::{SeqItemPort, Sequence, Sequencer};
pub use crate::signal::{Signal, SimObject};
pub use crate::sim_if::Sim;
pub use crate::tb_obj::TbObj;
pub use crate::test::{run_test, run_tests, Test, TestRegistry};
pub use crate::testbench::{clock, Report};
pub use crate::trigger::Trigger;
pub use crate::utils::clock_cycles;
pub use futures::future::FutureExt;
