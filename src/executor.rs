use futures::{
    future::{FutureExt, LocalBoxFuture},
    task::{waker_ref, ArcWake, Context, Poll},
};
use futures_channel::oneshot;
use intmap::IntMap;
use parking_lot::Mutex;
use queues::{IsQueue, Queue};
use std::{
    cell::{Cell, RefCell},
    future::Future,
    pin::Pin,
    rc::{Rc, Weak},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tracing::trace;

use crate::error::{TbError, TbResult};

// Wakers must be Send + Sync, so the ready queue only ever holds task ids.
type ReadyQueue = Arc<Mutex<Queue<u64>>>;

struct TaskWaker {
    id: u64,
    queued: AtomicBool,
    ready: ReadyQueue,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        // a task sits in the ready queue at most once
        if !arc_self.queued.swap(true, Ordering::AcqRel) {
            let _ = arc_self.ready.lock().add(arc_self.id);
        }
    }
}

struct Task {
    name: String,
    future: Option<LocalBoxFuture<'static, ()>>,
    waker: Arc<TaskWaker>,
}

struct ExecutorInner {
    tasks: RefCell<IntMap<Task>>,
    ready: ReadyQueue,
    next_id: Cell<u64>,
}

/// Single threaded cooperative executor. Tasks only run from within [`Executor::run_once`],
/// which polls every ready task until none is left.
#[derive(Clone)]
pub struct Executor(Rc<ExecutorInner>);

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    pub fn new() -> Self {
        Executor(Rc::new(ExecutorInner {
            tasks: RefCell::new(IntMap::new()),
            ready: Arc::new(Mutex::new(Queue::new())),
            next_id: Cell::new(0),
        }))
    }

    pub fn spawn<F>(&self, name: &str, future: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let (tx, rx) = oneshot::channel();
        let id = self.0.next_id.get();
        self.0.next_id.set(id + 1);

        let wrapped = async move {
            let result = future.await;
            // receiver may already be gone, nobody is interested in the result then
            let _ = tx.send(result);
        };
        let waker = Arc::new(TaskWaker {
            id,
            queued: AtomicBool::new(false),
            ready: self.0.ready.clone(),
        });
        let task = Task {
            name: name.to_string(),
            future: Some(wrapped.boxed_local()),
            waker: waker.clone(),
        };
        self.0.tasks.borrow_mut().insert(id, task);
        ArcWake::wake_by_ref(&waker);
        trace!(task = name, id, "spawned");

        JoinHandle {
            id,
            name: name.to_string(),
            rx,
            exec: Rc::downgrade(&self.0),
        }
    }

    fn next_task(&self) -> Option<u64> {
        self.0.ready.lock().remove().ok()
    }

    /// Polls ready tasks until the ready queue is empty. Returns the number of polls.
    pub fn run_once(&self) -> usize {
        let mut polls = 0;
        while let Some(id) = self.next_task() {
            // Take the future out of its slot so the task can spawn or cancel others while running.
            let (mut fut, waker) = {
                let mut tasks = self.0.tasks.borrow_mut();
                match tasks.get_mut(id) {
                    Some(task) => match task.future.take() {
                        Some(fut) => (fut, task.waker.clone()),
                        None => continue,
                    },
                    // cancelled after it was woken
                    None => continue,
                }
            };
            waker.queued.store(false, Ordering::Release);

            let w = waker_ref(&waker);
            let mut cx = Context::from_waker(&w);
            polls += 1;
            match fut.as_mut().poll(&mut cx) {
                Poll::Pending => {
                    if let Some(task) = self.0.tasks.borrow_mut().get_mut(id) {
                        task.future = Some(fut);
                    }
                }
                Poll::Ready(()) => {
                    if let Some(task) = self.0.tasks.borrow_mut().remove(id) {
                        trace!(task = task.name.as_str(), id, "completed");
                    }
                }
            }
        }
        polls
    }

    pub fn live_tasks(&self) -> usize {
        self.0.tasks.borrow().len()
    }

    pub fn cancel_all(&self) {
        // drop outside of the borrow, dropping a future may drop JoinHandles of other tasks
        let drained: Vec<Task> = self.0.tasks.borrow_mut().drain().map(|(_, t)| t).collect();
        drop(drained);
        let mut ready = self.0.ready.lock();
        while ready.remove().is_ok() {}
    }
}

fn cancel_task(exec: &Weak<ExecutorInner>, id: u64) {
    if let Some(exec) = exec.upgrade() {
        let task = exec.tasks.borrow_mut().remove(id);
        drop(task);
    }
}

pub struct JoinHandle<T> {
    id: u64,
    name: String,
    rx: oneshot::Receiver<T>,
    exec: Weak<ExecutorInner>,
}

impl<T> JoinHandle<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-blocking check for the task's result.
    pub fn try_join(&mut self) -> Option<TbResult<T>> {
        match self.rx.try_recv() {
            Ok(Some(result)) => Some(Ok(result)),
            Ok(None) => None,
            Err(_) => Some(Err(TbError::TaskCancelled(self.name.clone()))),
        }
    }

    pub fn cancel(self) {
        cancel_task(&self.exec, self.id);
    }
}

impl<T> Future for JoinHandle<T> {
    type Output = TbResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.rx.poll_unpin(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(Ok(result)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(TbError::TaskCancelled(self.name.clone()))),
            Poll::Pending => Poll::Pending,
        }
    }
}
