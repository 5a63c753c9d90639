use thiserror::Error;

pub type TbResult<T> = Result<T, TbError>;

#[derive(Debug, Error)]
pub enum TbError {
    #[error("unknown time unit '{0}'")]
    TimeUnit(String),
    #[error(
        "can't convert {time} {unit} to sim steps without rounding \
         (sim precision: 1e{precision} s)"
    )]
    TimeRounding { time: f64, unit: String, precision: i8 },
    #[error("no signal named '{0}'")]
    UnknownSignal(String),
    #[error("unknown test '{0}'")]
    UnknownTest(String),
    #[error("unknown sequence policy '{0}'")]
    UnknownSequence(String),
    #[error("get_next_item() called on '{0}' while the previous item is still outstanding")]
    ItemOutstanding(String),
    #[error("item_done() called on '{0}' with no item outstanding")]
    NoItemOutstanding(String),
    #[error("sequencer '{0}' is closed")]
    SequencerClosed(String),
    #[error("sequencer '{0}' already has a driver connected")]
    PortTaken(String),
    #[error("objection '{0}' dropped more often than raised")]
    ObjectionUnderflow(String),
    #[error("task '{0}' was cancelled")]
    TaskCancelled(String),
    #[error("simulation stalled at {time_ns} ns: no runnable task and no pending event")]
    Stalled { time_ns: f64 },
    #[error("more than {limit} delta cycles at {time_ns} ns")]
    DeltaOverflow { limit: u32, time_ns: f64 },
    #[error("simulation time limit of {limit_ns} ns exceeded")]
    SimTimeLimit { limit_ns: u64 },
    #[error("scoreboard: {failed} of {total} transaction(s) failed")]
    ScoreboardMismatch { failed: u64, total: u64 },
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("could not write junit report: {0}")]
    Junit(String),
}
