use rand::rngs::StdRng;
use std::fmt;
use std::str::FromStr;

use crate::error::TbError;
use crate::gcd::transaction::GcdTransaction;
use crate::sequencer::Sequence;

// Zero operands are left out: the subtractive design never finishes on them.
// Pairs such as (1, large) are left out as well, they need more cycles than the result timeout.
pub const DIRECTED_CASES: [(u32, u32); 9] = [
    (1, 1),
    (17, 19),
    (48, 18),
    (100, 100),
    (65535, 65535),
    (256, 1024),
    (15, 25),
    (54, 24),
    (1071, 462),
];

// (65535, 1), (2, 65534) and (65535, 65534) would take tens of thousands of cycles.
pub const CORNER_CASES: [(u32, u32); 5] = [(32768, 32768), (255, 256), (3, 5), (7, 11), (13, 17)];

/// Replays a fixed list of operand pairs in order.
pub struct VectorSequence {
    name: String,
    prefix: &'static str,
    cases: Vec<(u32, u32)>,
    idx: usize,
}

impl VectorSequence {
    pub fn new(name: &str, cases: &[(u32, u32)]) -> Self {
        Self {
            name: name.to_string(),
            prefix: "vector_txn",
            cases: cases.to_vec(),
            idx: 0,
        }
    }

    pub fn directed() -> Self {
        Self {
            prefix: "directed_txn",
            ..Self::new("directed_seq", &DIRECTED_CASES)
        }
    }

    pub fn corner_cases() -> Self {
        Self {
            prefix: "corner_txn",
            ..Self::new("corner_seq", &CORNER_CASES)
        }
    }
}

impl Sequence<GcdTransaction> for VectorSequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_item(&mut self) -> Option<GcdTransaction> {
        let (v1, v2) = *self.cases.get(self.idx)?;
        let txn = GcdTransaction::with_values(&format!("{}_{}", self.prefix, self.idx), v1, v2);
        self.idx += 1;
        Some(txn)
    }
}

/// `count` draws from the tiered random distribution.
pub struct RandomSequence {
    count: usize,
    issued: usize,
    rng: StdRng,
}

impl RandomSequence {
    pub fn new(count: usize, rng: StdRng) -> Self {
        Self { count, issued: 0, rng }
    }
}

impl Sequence<GcdTransaction> for RandomSequence {
    fn name(&self) -> &str {
        "random_seq"
    }

    fn next_item(&mut self) -> Option<GcdTransaction> {
        if self.issued == self.count {
            return None;
        }
        let mut txn = GcdTransaction::new(&format!("random_txn_{}", self.issued));
        txn.randomize(&mut self.rng);
        self.issued += 1;
        Some(txn)
    }
}

/// Rapid consecutive dispatch: every third item is quick, the rest use the full distribution.
pub struct BackToBackSequence {
    count: usize,
    issued: usize,
    rng: StdRng,
}

impl BackToBackSequence {
    pub fn new(count: usize, rng: StdRng) -> Self {
        Self { count, issued: 0, rng }
    }
}

impl Sequence<GcdTransaction> for BackToBackSequence {
    fn name(&self) -> &str {
        "b2b_seq"
    }

    fn next_item(&mut self) -> Option<GcdTransaction> {
        if self.issued == self.count {
            return None;
        }
        let mut txn = GcdTransaction::new(&format!("b2b_txn_{}", self.issued));
        if self.issued % 3 == 0 {
            txn.randomize_quick(&mut self.rng);
        } else {
            txn.randomize(&mut self.rng);
        }
        self.issued += 1;
        Some(txn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    Directed,
    CornerCase,
    Random,
    BackToBack,
}

impl SequenceKind {
    pub const ALL: [SequenceKind; 4] = [
        SequenceKind::Directed,
        SequenceKind::CornerCase,
        SequenceKind::Random,
        SequenceKind::BackToBack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceKind::Directed => "directed",
            SequenceKind::CornerCase => "corner_case",
            SequenceKind::Random => "random",
            SequenceKind::BackToBack => "back_to_back",
        }
    }

    /// `count` only applies to the random policies, the literal lists have a fixed length.
    pub fn build(self, count: usize, rng: StdRng) -> Box<dyn Sequence<GcdTransaction>> {
        match self {
            SequenceKind::Directed => Box::new(VectorSequence::directed()),
            SequenceKind::CornerCase => Box::new(VectorSequence::corner_cases()),
            SequenceKind::Random => Box::new(RandomSequence::new(count, rng)),
            SequenceKind::BackToBack => Box::new(BackToBackSequence::new(count, rng)),
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SequenceKind {
    type Err = TbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SequenceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| TbError::UnknownSequence(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::seeded_rng;

    fn drain(seq: &mut dyn Sequence<GcdTransaction>) -> Vec<GcdTransaction> {
        std::iter::from_fn(|| seq.next_item()).collect()
    }

    #[test]
    fn directed_replays_the_literal_list() {
        let items = drain(&mut VectorSequence::directed());
        let pairs: Vec<_> = items.iter().map(|t| (t.value1, t.value2)).collect();
        assert_eq!(pairs, DIRECTED_CASES.to_vec());
        assert_eq!(items[3].name, "directed_txn_3");
        assert!(items.iter().all(|t| t.loading_values));
    }

    #[test]
    fn corner_cases_replay_in_order() {
        let items = drain(&mut VectorSequence::corner_cases());
        assert_eq!((items[1].value1, items[1].value2), (255, 256));
        assert_eq!(items.len(), CORNER_CASES.len());
    }

    #[test]
    fn random_sequence_is_reproducible() {
        let a = drain(&mut RandomSequence::new(25, seeded_rng(11, 2)));
        let b = drain(&mut RandomSequence::new(25, seeded_rng(11, 2)));
        assert_eq!(a.len(), 25);
        assert_eq!(a, b);
        assert!(a.iter().all(|t| t.value1 > 0 && t.value2 > 0));
    }

    #[test]
    fn back_to_back_uses_quick_tier_every_third_item() {
        let items = drain(&mut BackToBackSequence::new(30, seeded_rng(5, 0)));
        assert_eq!(items.len(), 30);
        for t in items.iter().step_by(3) {
            assert!(t.value1 <= 100 && t.value2 <= 100);
        }
    }

    #[test]
    fn policies_parse_by_name() {
        for kind in SequenceKind::ALL {
            assert_eq!(kind.to_string().parse::<SequenceKind>().unwrap(), kind);
        }
        assert!(matches!("fuzz".parse::<SequenceKind>(), Err(TbError::UnknownSequence(_))));
    }
}
