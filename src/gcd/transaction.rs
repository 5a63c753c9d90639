use rand::Rng;
use std::fmt;

/// One GCD request and the design's answer.
///
/// Equality compares the operands and the captured result only. Transactions observed by the
/// driver and by the monitor for the same computation are distinct objects that compare equal.
#[derive(Clone, Debug, Default)]
pub struct GcdTransaction {
    pub name: String,
    pub value1: u32,
    pub value2: u32,
    pub loading_values: bool,
    pub output_gcd: u32,
    pub output_valid: bool,
}

impl GcdTransaction {
    /// Bit width of the operand and result fields.
    pub const WIDTH: u32 = 16;
    pub const MAX_VALUE: u32 = (1 << Self::WIDTH) - 1;

    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_values(name: &str, value1: u32, value2: u32) -> Self {
        Self {
            name: name.to_string(),
            value1,
            value2,
            loading_values: true,
            ..Default::default()
        }
    }

    /// Draws operands from the tiered distribution.
    ///
    /// The reference design subtracts the smaller operand from the larger one per clock, so its
    /// latency grows with the operand ratio. Draws stay away from 0 (never completes) and are
    /// biased towards moderate magnitudes or shared factors. Pairs like (1, 10000) are still
    /// possible and need a result timeout above the larger operand.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) -> &mut Self {
        if rng.gen::<f64>() < 0.7 {
            self.value1 = rng.gen_range(1..=10_000);
            self.value2 = rng.gen_range(1..=10_000);
        } else if rng.gen::<f64>() < 0.8 {
            self.value1 = rng.gen_range(1..=1_000);
            self.value2 = rng.gen_range(1..=1_000);
        } else {
            // multiples of a common base resolve in a few steps
            let base: u32 = rng.gen_range(1..=20_000);
            self.value1 = base * rng.gen_range(1..=3);
            self.value2 = base * rng.gen_range(1..=3);
        }
        self.loading_values = true;
        self
    }

    /// Small operands, the design answers within a hundred cycles.
    pub fn randomize_quick<R: Rng>(&mut self, rng: &mut R) -> &mut Self {
        self.value1 = rng.gen_range(1..=100);
        self.value2 = rng.gen_range(1..=100);
        self.loading_values = true;
        self
    }
}

impl PartialEq for GcdTransaction {
    fn eq(&self, other: &Self) -> bool {
        self.value1 == other.value1
            && self.value2 == other.value2
            && self.output_gcd == other.output_gcd
            && self.output_valid == other.output_valid
    }
}

impl Eq for GcdTransaction {}

impl fmt::Display for GcdTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(value1={}, value2={}, loadingValues={}, outputGCD={}, outputValid={})",
            self.name,
            self.value1,
            self.value2,
            self.loading_values,
            self.output_gcd,
            self.output_valid
        )
    }
}
