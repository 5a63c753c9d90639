use std::{cell::Cell, future::Future, rc::Rc, task::Waker};

use crate::error::{TbError, TbResult};
use crate::executor::{Executor, JoinHandle};
use crate::signal::SimObject;
use crate::trigger::{EdgeKind, Trigger};

#[derive(Debug, Hash, Clone, Copy, Eq, PartialEq)]
pub enum SimCallback {
    // relative to the current simulation time, in steps
    Time(u64),
    Edge(usize, EdgeKind),
}

/// Registration of an awaiting [`Trigger`]. The simulator sets `fired` before waking.
#[derive(Debug, Clone)]
pub struct TrigShared {
    pub(crate) waker: Waker,
    pub(crate) fired: Rc<Cell<bool>>,
}

impl TrigShared {
    pub(crate) fn fire(self) {
        self.fired.set(true);
        self.waker.wake();
    }
}

/// Signal level capabilities a simulator offers to the testbench.
pub trait SimIf {
    fn get_root_name(&self) -> String;
    fn get_handle_by_name(&self, full_name: &str) -> TbResult<usize>;
    fn get_full_name(&self, handle: usize) -> String;
    fn get_size(&self, handle: usize) -> u32;
    fn get_value(&self, handle: usize) -> u64;
    // Writes become visible once all currently runnable tasks have yielded.
    fn set_value(&self, handle: usize, value: u64);
    fn get_sim_time_steps(&self) -> u64;
    fn get_sim_precision(&self) -> i8;
    fn register_callback(&self, cb: SimCallback, trig: TrigShared);
    fn cancel_all_callbacks(&self);

    fn get_sim_time(&self, unit: &str) -> TbResult<f64> {
        // this function does not preserve precision, so don't use carelessly
        let t = self.get_sim_time_steps() as f64;
        let precision = self.get_sim_precision();
        Ok(ldexp10(t, precision - time_scale(unit)?))
    }
    fn get_sim_steps(&self, time: f64, unit: &str) -> TbResult<u64> {
        let precision = self.get_sim_precision();
        let steps = ldexp10(time, time_scale(unit)? - precision);
        if steps % 1.0 == 0.0 {
            Ok(steps as u64)
        } else {
            Err(TbError::TimeRounding {
                time,
                unit: unit.to_string(),
                precision,
            })
        }
    }
}

pub(crate) fn time_scale(unit: &str) -> TbResult<i8> {
    match unit {
        "fs" => Ok(-15),
        "ps" => Ok(-12),
        "ns" => Ok(-9),
        "us" => Ok(-6),
        "ms" => Ok(-3),
        "sec" => Ok(0),
        _ => Err(TbError::TimeUnit(unit.to_string())),
    }
}

fn ldexp10(frac: f64, exp: i8) -> f64 {
    // Like math.ldexp, but base 10
    if exp >= 0 {
        frac * 10_u64.pow(exp as u32) as f64
    } else {
        let div = 10_u64.pow(-exp as u32) as f64;
        frac / div
    }
}

/// Context handed to every testbench component: the simulator interface plus the executor
/// running the testbench tasks.
#[derive(Clone)]
pub struct Sim {
    iface: Rc<dyn SimIf>,
    exec: Executor,
}

impl Sim {
    pub fn new(iface: Rc<dyn SimIf>, exec: Executor) -> Self {
        Self { iface, exec }
    }

    pub fn iface(&self) -> &Rc<dyn SimIf> {
        &self.iface
    }

    pub fn root(&self) -> SimObject {
        SimObject::new(self.iface.get_root_name(), self.clone())
    }

    pub fn spawn<F>(&self, name: &str, future: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        self.exec.spawn(name, future)
    }

    pub fn time_steps(&self) -> u64 {
        self.iface.get_sim_time_steps()
    }

    pub fn time_ns(&self) -> f64 {
        let precision = self.iface.get_sim_precision();
        ldexp10(self.time_steps() as f64, precision + 9)
    }

    pub fn timer(&self, time: u64, unit: &str) -> TbResult<Trigger> {
        let steps = self.iface.get_sim_steps(time as f64, unit)?;
        Ok(Trigger::timer_steps(self.iface.clone(), steps))
    }
}
