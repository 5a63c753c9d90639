use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::tb_obj::TbObj;

pub trait Subscriber<T> {
    fn receive(&mut self, item: &T);
}

/// Synchronous broadcast of published items to every connected subscriber.
///
/// `publish` delivers to all subscribers in connection order before it returns. Items are
/// handed out by shared reference, nobody can change them once published.
pub struct AnalysisPort<T> {
    name: String,
    subscribers: Vec<Rc<RefCell<dyn Subscriber<T>>>>,
    published: Cell<u64>,
}

impl<T> AnalysisPort<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: Vec::new(),
            published: Cell::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connect<S: Subscriber<T> + 'static>(&mut self, subscriber: &TbObj<S>) {
        let sub: Rc<RefCell<dyn Subscriber<T>>> = subscriber.0.clone();
        self.subscribers.push(sub);
    }

    pub fn publish(&self, item: &T) {
        self.published.set(self.published.get() + 1);
        for sub in &self.subscribers {
            sub.borrow_mut().receive(item);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn publish_count(&self) -> u64 {
        self.published.get()
    }
}
