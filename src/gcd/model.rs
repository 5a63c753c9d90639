use crate::design::{Design, DesignIo, Port};

pub const CLOCK: &str = "clock";
pub const RESET: &str = "reset";
pub const LOADING_VALUES: &str = "io_loadingValues";
pub const VALUE1: &str = "io_value1";
pub const VALUE2: &str = "io_value2";
pub const OUTPUT_GCD: &str = "io_outputGCD";
pub const OUTPUT_VALID: &str = "io_outputValid";

// port indices, in the order of GcdModel::ports()
const P_CLOCK: usize = 0;
const P_RESET: usize = 1;
const P_LOAD: usize = 2;
const P_VALUE1: usize = 3;
const P_VALUE2: usize = 4;
const P_GCD: usize = 5;
const P_VALID: usize = 6;

pub fn gcd_ports(width: u32) -> Vec<Port> {
    vec![
        Port::input(CLOCK, 1),
        Port::input(RESET, 1),
        Port::input(LOADING_VALUES, 1),
        Port::input(VALUE1, width),
        Port::input(VALUE2, width),
        Port::output(OUTPUT_GCD, width),
        Port::output(OUTPUT_VALID, 1),
    ]
}

/// Behavioural model of the subtractive GCD unit.
///
/// A load captures both operands. Every following clock subtracts the smaller register from the
/// larger one until `y` reaches zero, `x` then holds the result. Latency is roughly the larger
/// operand divided by the smaller one, a zero `x` with nonzero `y` never completes.
#[derive(Debug, Default)]
pub struct GcdModel {
    x: u64,
    y: u64,
}

impl GcdModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Design for GcdModel {
    fn name(&self) -> &str {
        "gcd"
    }

    fn ports(&self) -> Vec<Port> {
        gcd_ports(16)
    }

    fn clock_port(&self) -> usize {
        P_CLOCK
    }

    fn on_rising_edge(&mut self, io: &mut DesignIo<'_>) {
        if io.is_high(P_RESET) {
            self.x = 0;
            self.y = 0;
        } else if io.is_high(P_LOAD) {
            self.x = io.get(P_VALUE1);
            self.y = io.get(P_VALUE2);
        } else if self.x > self.y {
            self.x -= self.y;
        } else {
            self.y -= self.x;
        }
        io.set(P_GCD, self.x);
        io.set(P_VALID, (self.y == 0) as u64);
    }
}
