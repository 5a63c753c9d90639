use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

// TbObj allows tasks to mutably share testbench objects (scoreboards, coverage collectors,
// statistics). All tasks run on one thread, so Rc<RefCell> is sufficient.
pub struct TbObj<T>(pub(crate) Rc<RefCell<T>>);

impl<T> TbObj<T> {
    pub fn new(data: T) -> TbObj<T> {
        TbObj(Rc::new(RefCell::new(data)))
    }
    pub fn get(&self) -> Ref<T> {
        (*self.0).borrow()
    }
    pub fn get_mut(&self) -> RefMut<T> {
        (*self.0).borrow_mut()
    }
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.get_mut())
    }
}

impl<T> Clone for TbObj<T> {
    fn clone(&self) -> Self {
        TbObj(self.0.clone())
    }
}

impl<T: Default> Default for TbObj<T> {
    fn default() -> Self {
        TbObj::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for TbObj<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TbObj").field(&*self.get()).finish()
    }
}
