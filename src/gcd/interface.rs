use crate::error::TbResult;
use crate::gcd::model;
use crate::signal::{SimObject, Signal};

/// The GCD unit's signal level interface as seen by the testbench.
#[derive(Clone, Debug)]
pub struct GcdIo {
    pub clock: Signal,
    pub reset: Signal,
    pub loading_values: Signal,
    pub value1: Signal,
    pub value2: Signal,
    pub output_gcd: Signal,
    pub output_valid: Signal,
}

impl GcdIo {
    pub fn bind(dut: &SimObject) -> TbResult<Self> {
        Ok(Self {
            clock: dut.signal(model::CLOCK)?,
            reset: dut.signal(model::RESET)?,
            loading_values: dut.signal(model::LOADING_VALUES)?,
            value1: dut.signal(model::VALUE1)?,
            value2: dut.signal(model::VALUE2)?,
            output_gcd: dut.signal(model::OUTPUT_GCD)?,
            output_valid: dut.signal(model::OUTPUT_VALID)?,
        })
    }
}
