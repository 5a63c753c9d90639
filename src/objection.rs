use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use tracing::{debug, error};

use crate::error::{TbError, TbResult};
use crate::tb_obj::TbObj;

struct ObjectionInner {
    name: String,
    count: u32,
    raised: bool,
    waiters: Vec<Waker>,
}

/// Run completion gate. The run ends once the objection was raised and every raise was dropped.
#[derive(Clone)]
pub struct Objection(TbObj<ObjectionInner>);

impl Objection {
    pub fn new(name: &str) -> Self {
        Self(TbObj::new(ObjectionInner {
            name: name.to_string(),
            count: 0,
            raised: false,
            waiters: Vec::new(),
        }))
    }

    /// Raises the objection until the returned guard is dropped.
    #[must_use = "the objection is dropped together with the guard"]
    pub fn raise(&self, by: &str) -> ObjectionGuard {
        self.0.with_mut(|o| {
            o.count += 1;
            o.raised = true;
            debug!(objection = o.name.as_str(), by, count = o.count, "raised");
        });
        ObjectionGuard {
            objection: self.clone(),
            by: by.to_string(),
        }
    }

    // released only through ObjectionGuard::drop
    pub(crate) fn drop_objection(&self, by: &str) -> TbResult<()> {
        let waiters = self.0.with_mut(|o| {
            if o.count == 0 {
                return Err(TbError::ObjectionUnderflow(o.name.clone()));
            }
            o.count -= 1;
            debug!(objection = o.name.as_str(), by, count = o.count, "dropped");
            Ok(if o.count == 0 { std::mem::take(&mut o.waiters) } else { Vec::new() })
        })?;
        for w in waiters {
            w.wake();
        }
        Ok(())
    }

    pub fn count(&self) -> u32 {
        self.0.get().count
    }

    pub fn is_done(&self) -> bool {
        let o = self.0.get();
        o.raised && o.count == 0
    }

    pub fn all_dropped(&self) -> AllDropped {
        AllDropped(self.clone())
    }
}

pub struct ObjectionGuard {
    objection: Objection,
    by: String,
}

impl Drop for ObjectionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.objection.drop_objection(&self.by) {
            error!("{}", e);
        }
    }
}

pub struct AllDropped(Objection);

impl Future for AllDropped {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.0.is_done() {
            Poll::Ready(())
        } else {
            let mut inner = self.0 .0.get_mut();
            if !inner.waiters.iter().any(|w| w.will_wake(cx.waker())) {
                inner.waiters.push(cx.waker().clone());
            }
            Poll::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Executor;

    #[test]
    fn completes_when_last_guard_is_dropped() {
        let exec = Executor::new();
        let objection = Objection::new("run");
        let mut waiter = exec.spawn("waiter", objection.all_dropped());
        exec.run_once();
        // never raised, still waiting
        assert!(waiter.try_join().is_none());

        let a = objection.raise("a");
        let b = objection.raise("b");
        assert_eq!(objection.count(), 2);
        drop(a);
        exec.run_once();
        assert!(waiter.try_join().is_none());
        drop(b);
        exec.run_once();
        assert!(matches!(waiter.try_join(), Some(Ok(()))));
        assert!(objection.is_done());
    }

    #[test]
    fn repeated_polls_register_one_waker() {
        let exec = Executor::new();
        let objection = Objection::new("run");
        let _guard = objection.raise("a");
        let waiting = objection.clone();
        exec.spawn("poller", async move {
            let mut fut = waiting.all_dropped();
            for _ in 0..5 {
                let polled = futures::poll!(&mut fut);
                assert!(polled.is_pending());
            }
            fut.await;
        });
        exec.run_once();
        assert_eq!(objection.0.get().waiters.len(), 1);
    }

    #[test]
    fn dropping_unraised_objection_is_an_error() {
        let objection = Objection::new("run");
        assert!(matches!(
            objection.drop_objection("nobody"),
            Err(TbError::ObjectionUnderflow(_))
        ));
    }
}
