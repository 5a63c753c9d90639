#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Copy, Clone, Debug)]
pub struct Port {
    pub name: &'static str,
    pub width: u32,
    pub direction: Direction,
}

impl Port {
    pub const fn input(name: &'static str, width: u32) -> Self {
        Port { name, width, direction: Direction::Input }
    }
    pub const fn output(name: &'static str, width: u32) -> Self {
        Port { name, width, direction: Direction::Output }
    }
}

/// A clocked design hosted by the [`Kernel`](crate::kernel::Kernel).
///
/// Ports are addressed by their index in [`Design::ports`]. The kernel calls
/// [`Design::on_rising_edge`] once per rising edge of the clock port, after the testbench
/// writes of that delta were committed and before any task observes the edge.
pub trait Design {
    fn name(&self) -> &str;
    fn ports(&self) -> Vec<Port>;
    fn clock_port(&self) -> usize;
    fn on_rising_edge(&mut self, io: &mut DesignIo<'_>);
}

pub(crate) struct SignalSlot {
    pub name: String,
    pub width: u32,
    pub value: u64,
}

impl SignalSlot {
    pub fn mask(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }
}

/// Value change of a signal, `(handle, old, new)`.
pub(crate) type Change = (usize, u64, u64);

pub struct DesignIo<'a> {
    pub(crate) signals: &'a mut [SignalSlot],
    pub(crate) changes: &'a mut Vec<Change>,
}

impl<'a> DesignIo<'a> {
    pub fn get(&self, port: usize) -> u64 {
        self.signals[port].value
    }
    pub fn is_high(&self, port: usize) -> bool {
        self.get(port) & 1 == 1
    }
    pub fn set(&mut self, port: usize, value: u64) {
        let slot = &mut self.signals[port];
        let value = value & slot.mask();
        if slot.value != value {
            self.changes.push((port, slot.value, value));
            slot.value = value;
        }
    }
}
