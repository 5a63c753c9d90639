use intmap::IntMap;
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap, VecDeque},
    rc::Rc,
};
use tracing::trace;

use crate::design::{Change, Design, DesignIo, SignalSlot};
use crate::error::{TbError, TbResult};
use crate::executor::{Executor, JoinHandle};
use crate::sim_if::{Sim, SimCallback, SimIf, TrigShared};
use crate::trigger::EdgeKind;

// one step is one picosecond
const PRECISION: i8 = -12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Writes were committed at the current time, triggered tasks are ready to run.
    Delta,
    /// Time advanced to the contained step count and timers fired.
    Advanced(u64),
    /// Nothing left to do: no runnable task, no write, no timer.
    Idle,
}

struct KernelState {
    time: u64,
    deltas: u32,
    signals: Vec<SignalSlot>,
    names: HashMap<String, usize>,
    pending: Vec<(usize, u64)>,
    // key is signal handle
    edges: IntMap<VecDeque<(EdgeKind, TrigShared)>>,
    // key is absolute callback time
    timers: BTreeMap<u64, VecDeque<TrigShared>>,
}

/// In-process event driven simulator hosting a single [`Design`].
///
/// Testbench writes are deferred and committed together once every ready task has run, so all
/// tasks woken by the same event observe the same signal values.
pub struct Kernel {
    exec: Executor,
    root: String,
    clock: usize,
    delta_limit: u32,
    design: RefCell<Box<dyn Design>>,
    state: RefCell<KernelState>,
}

impl Kernel {
    pub fn new(design: Box<dyn Design>, delta_limit: u32) -> Rc<Self> {
        let root = design.name().to_string();
        let mut signals = Vec::new();
        let mut names = HashMap::new();
        for (handle, port) in design.ports().into_iter().enumerate() {
            let name = format!("{}.{}", root, port.name);
            names.insert(name.clone(), handle);
            signals.push(SignalSlot {
                name,
                width: port.width,
                value: 0,
            });
        }
        Rc::new(Kernel {
            exec: Executor::new(),
            root,
            clock: design.clock_port(),
            delta_limit,
            design: RefCell::new(design),
            state: RefCell::new(KernelState {
                time: 0,
                deltas: 0,
                signals,
                names,
                pending: Vec::new(),
                edges: IntMap::new(),
                timers: BTreeMap::new(),
            }),
        })
    }

    pub fn sim(self: &Rc<Self>) -> Sim {
        let iface: Rc<dyn SimIf> = self.clone();
        Sim::new(iface, self.exec.clone())
    }

    pub fn executor(&self) -> &Executor {
        &self.exec
    }

    fn time_ns(&self) -> f64 {
        self.get_sim_time("ns").unwrap_or_default()
    }

    /// Runs all ready tasks, then either commits their writes or advances time.
    pub fn step(&self) -> TbResult<Step> {
        self.exec.run_once();

        let changes = self.commit();
        if !changes.is_empty() {
            let deltas = {
                let mut state = self.state.borrow_mut();
                state.deltas += 1;
                state.deltas
            };
            if deltas > self.delta_limit {
                return Err(TbError::DeltaOverflow {
                    limit: self.delta_limit,
                    time_ns: self.time_ns(),
                });
            }
            self.react(&changes);
            return Ok(Step::Delta);
        }

        Ok(match self.advance() {
            Some(time) => Step::Advanced(time),
            None => Step::Idle,
        })
    }

    fn commit(&self) -> Vec<Change> {
        let mut state = self.state.borrow_mut();
        let pending = std::mem::take(&mut state.pending);

        // several writes to one signal within a delta collapse into one change
        let mut changes: Vec<Change> = Vec::new();
        for (handle, value) in pending {
            let slot = &mut state.signals[handle];
            let value = value & slot.mask();
            match changes.iter_mut().find(|(h, _, _)| *h == handle) {
                Some(change) => change.2 = value,
                None => changes.push((handle, slot.value, value)),
            }
            slot.value = value;
        }
        changes.retain(|(_, old, new)| old != new);

        let clock_rose = changes
            .iter()
            .any(|&(h, old, new)| h == self.clock && EdgeKind::Rising.matches(old, new));
        if clock_rose {
            let mut io = DesignIo {
                signals: &mut state.signals,
                changes: &mut changes,
            };
            self.design.borrow_mut().on_rising_edge(&mut io);
        }
        changes
    }

    fn react(&self, changes: &[Change]) {
        let mut wake = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            for &(handle, old, new) in changes {
                if let Some(mut waiting) = state.edges.remove(handle as u64) {
                    let mut resched = VecDeque::new();
                    for (kind, trig) in waiting.drain(..) {
                        if kind.matches(old, new) {
                            wake.push(trig);
                        } else {
                            resched.push_back((kind, trig));
                        }
                    }
                    if !resched.is_empty() {
                        state.edges.insert(handle as u64, resched);
                    }
                }
            }
        }
        for trig in wake {
            trig.fire();
        }
    }

    fn advance(&self) -> Option<u64> {
        let (time, due) = {
            let mut state = self.state.borrow_mut();
            let (time, due) = state.timers.pop_first()?;
            state.time = time;
            state.deltas = 0;
            (time, due)
        };
        trace!(time, n = due.len(), "timers due");
        for trig in due {
            trig.fire();
        }
        Some(time)
    }

    /// Steps the simulation until `handle` finished.
    ///
    /// Fails when the simulation runs out of events first or passes `limit_ns`.
    pub fn run_until<T>(&self, handle: &mut JoinHandle<T>, limit_ns: u64) -> TbResult<T> {
        let limit_steps = self.get_sim_steps(limit_ns as f64, "ns")?;
        loop {
            let step = self.step()?;
            if let Some(result) = handle.try_join() {
                return result;
            }
            match step {
                Step::Idle => {
                    return Err(TbError::Stalled {
                        time_ns: self.time_ns(),
                    })
                }
                Step::Advanced(time) if time > limit_steps => {
                    return Err(TbError::SimTimeLimit { limit_ns })
                }
                _ => {}
            }
        }
    }

    /// Drops every task and every registered callback.
    pub fn tear_down(&self) {
        self.cancel_all_callbacks();
        self.state.borrow_mut().pending.clear();
        self.exec.cancel_all();
    }
}

impl SimIf for Kernel {
    fn get_root_name(&self) -> String {
        self.root.clone()
    }
    fn get_handle_by_name(&self, full_name: &str) -> TbResult<usize> {
        self.state
            .borrow()
            .names
            .get(full_name)
            .copied()
            .ok_or_else(|| TbError::UnknownSignal(full_name.to_string()))
    }
    fn get_full_name(&self, handle: usize) -> String {
        self.state.borrow().signals[handle].name.clone()
    }
    fn get_size(&self, handle: usize) -> u32 {
        self.state.borrow().signals[handle].width
    }
    fn get_value(&self, handle: usize) -> u64 {
        self.state.borrow().signals[handle].value
    }
    fn set_value(&self, handle: usize, value: u64) {
        self.state.borrow_mut().pending.push((handle, value));
    }
    fn get_sim_time_steps(&self) -> u64 {
        self.state.borrow().time
    }
    fn get_sim_precision(&self) -> i8 {
        PRECISION
    }
    fn register_callback(&self, cb: SimCallback, trig: TrigShared) {
        let mut state = self.state.borrow_mut();
        match cb {
            SimCallback::Time(t) => {
                // simulator keeps absolute times
                let abs_time = state.time + t;
                state.timers.entry(abs_time).or_default().push_back(trig);
            }
            SimCallback::Edge(handle, kind) => {
                if let Some(callbacks) = state.edges.get_mut(handle as u64) {
                    callbacks.push_back((kind, trig));
                } else {
                    let mut vec = VecDeque::new();
                    vec.push_back((kind, trig));
                    state.edges.insert(handle as u64, vec);
                }
            }
        }
    }
    fn cancel_all_callbacks(&self) {
        let mut state = self.state.borrow_mut();
        state.edges.clear();
        state.timers.clear();
    }
}
