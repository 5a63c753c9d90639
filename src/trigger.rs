use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::sim_if::{SimCallback, SimIf, TrigShared};

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum EdgeKind {
    Any,
    Rising,
    Falling,
}

impl EdgeKind {
    /// Edges are judged on bit 0, any other bit only counts for `Any`.
    pub fn matches(self, old: u64, new: u64) -> bool {
        match self {
            EdgeKind::Any => old != new,
            EdgeKind::Rising => old & 1 == 0 && new & 1 == 1,
            EdgeKind::Falling => old & 1 == 1 && new & 1 == 0,
        }
    }
}

/// A one-shot wait on the simulator. Registered on first poll, ready once the simulator fired it.
#[must_use = "triggers do nothing unless awaited"]
pub struct Trigger {
    sim: Rc<dyn SimIf>,
    kind: SimCallback,
    fired: Option<Rc<Cell<bool>>>,
}

impl Trigger {
    pub fn timer_steps(sim: Rc<dyn SimIf>, steps: u64) -> Self {
        Trigger {
            sim,
            kind: SimCallback::Time(steps),
            fired: None,
        }
    }
    pub fn edge(sim: Rc<dyn SimIf>, handle: usize) -> Self {
        Self::edge_kind(sim, handle, EdgeKind::Any)
    }
    pub fn rising_edge(sim: Rc<dyn SimIf>, handle: usize) -> Self {
        Self::edge_kind(sim, handle, EdgeKind::Rising)
    }
    pub fn falling_edge(sim: Rc<dyn SimIf>, handle: usize) -> Self {
        Self::edge_kind(sim, handle, EdgeKind::Falling)
    }
    fn edge_kind(sim: Rc<dyn SimIf>, handle: usize, kind: EdgeKind) -> Self {
        Trigger {
            sim,
            kind: SimCallback::Edge(handle, kind),
            fired: None,
        }
    }
}

impl Future for Trigger {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &this.fired {
            Some(fired) if fired.get() => Poll::Ready(()),
            Some(_) => Poll::Pending,
            None => {
                let fired = Rc::new(Cell::new(false));
                this.sim.register_callback(
                    this.kind,
                    TrigShared {
                        waker: cx.waker().clone(),
                        fired: fired.clone(),
                    },
                );
                this.fired = Some(fired);
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_judged_on_bit_zero() {
        assert!(EdgeKind::Rising.matches(0, 1));
        assert!(!EdgeKind::Rising.matches(1, 0));
        assert!(EdgeKind::Falling.matches(3, 2));
        assert!(!EdgeKind::Rising.matches(2, 4));
        assert!(EdgeKind::Any.matches(2, 4));
        assert!(!EdgeKind::Any.matches(7, 7));
    }
}
