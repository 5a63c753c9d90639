use std::fmt;

use crate::error::TbResult;
use crate::sim_if::Sim;
use crate::trigger::Trigger;

/// A scope in the simulated hierarchy. The root scope is named after the design.
#[derive(Clone)]
pub struct SimObject {
    name: String,
    sim: Sim,
}

impl SimObject {
    pub(crate) fn new(name: String, sim: Sim) -> Self {
        Self { name, sim }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    pub fn signal(&self, name: &str) -> TbResult<Signal> {
        let mut full_name = self.name.clone();
        full_name.push('.');
        full_name.push_str(name);
        Signal::from_name(&self.sim, &full_name)
    }
}

impl fmt::Debug for SimObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimObject").field("name", &self.name).finish()
    }
}

/// Handle to a valued net of the design.
#[derive(Clone)]
pub struct Signal {
    handle: usize,
    width: u32,
    sim: Sim,
}

impl Signal {
    pub fn from_name(sim: &Sim, full_name: &str) -> TbResult<Self> {
        let handle = sim.iface().get_handle_by_name(full_name)?;
        Ok(Signal {
            handle,
            width: sim.iface().get_size(handle),
            sim: sim.clone(),
        })
    }

    pub fn handle(&self) -> usize {
        self.handle
    }

    pub fn size(&self) -> u32 {
        self.width
    }

    pub fn name(&self) -> String {
        self.sim.iface().get_full_name(self.handle)
    }

    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    pub fn u32(&self) -> u32 {
        self.sim.iface().get_value(self.handle) as u32
    }

    pub fn is_high(&self) -> bool {
        self.sim.iface().get_value(self.handle) & 1 == 1
    }

    pub fn set_u32(&self, val: u32) {
        self.sim.iface().set_value(self.handle, val as u64);
    }

    pub fn set_bool(&self, val: bool) {
        self.set_u32(val as u32);
    }

    // convenience functions to get edge triggers for this signal
    pub fn rising_edge(&self) -> Trigger {
        Trigger::rising_edge(self.sim.iface().clone(), self.handle)
    }
    pub fn falling_edge(&self) -> Trigger {
        Trigger::falling_edge(self.sim.iface().clone(), self.handle)
    }
    pub fn edge(&self) -> Trigger {
        Trigger::edge(self.sim.iface().clone(), self.handle)
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name())
            .field("width", &self.width)
            .finish()
    }
}
