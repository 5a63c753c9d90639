//! Transaction-level verification testbenches.
//!
//! Components exchange transactions instead of pin wiggles: a [`Sequencer`] hands items to a
//! driver one at a time, drivers and monitors publish what they saw on an [`AnalysisPort`],
//! and checkers subscribe to it. Everything runs as cooperative tasks on one thread, on top of
//! the in-process [`Kernel`](kernel::Kernel) or any other [`SimIf`](sim_if::SimIf).

pub mod analysis;
pub mod config;
pub mod design;
pub mod error;
mod executor;
pub mod gcd;
mod junit;
pub mod kernel;
pub mod logging;
pub mod objection;
pub mod prelude;
pub mod sequencer;
mod signal;
pub mod sim_if;
mod tb_obj;
pub mod test;
pub mod testbench;
mod trigger;
pub mod utils;

pub use analysis::{AnalysisPort, Subscriber};
pub use config::TbConfig;
pub use error::{TbError, TbResult};
pub use executor::{Executor, JoinHandle};
pub use objection::{Objection, ObjectionGuard};
pub use sequencer::{SeqItemPort, Sequence, Sequencer};
pub use signal::{Signal, SimObject};
pub use tb_obj::TbObj;
pub use trigger::{EdgeKind, Trigger};
