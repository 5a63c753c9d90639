//! Testbench for a GCD unit: a subtractive design with a load strobe, two 16 bit operands, a
//! result and a result-valid flag.

pub mod coverage;
pub mod driver;
pub mod env;
pub mod interface;
pub mod model;
pub mod monitor;
pub mod scoreboard;
pub mod sequences;
pub mod suite;
pub mod transaction;

pub use coverage::{CoverageBin, GcdCoverage};
pub use driver::{DriverConfig, DriverStats, GcdDriver};
pub use env::GcdEnv;
pub use interface::GcdIo;
pub use model::GcdModel;
pub use monitor::{GcdMonitor, MonitorStats};
pub use scoreboard::{reference_gcd, GcdScoreboard};
pub use sequences::SequenceKind;
pub use transaction::GcdTransaction;
