use futures::lock::Mutex;
use futures::{SinkExt, StreamExt};
use futures_channel::{mpsc, oneshot};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

use crate::error::{TbError, TbResult};

/// Produces an ordered stream of items, one per call.
pub trait Sequence<T> {
    fn name(&self) -> &str;
    fn next_item(&mut self) -> Option<T>;
}

struct Handoff<T> {
    item: T,
    done: oneshot::Sender<()>,
}

/// Single slot rendezvous between the sequences started on it and exactly one driver.
///
/// [`Sequencer::start`] hands one item at a time to the driver's [`SeqItemPort`] and does not
/// produce the next item before the driver signalled [`SeqItemPort::item_done`]. Sequences
/// started concurrently on clones of one sequencer take turns per item.
pub struct Sequencer<T> {
    name: String,
    // one sender for all clones, locked from production until item_done
    tx: Rc<Mutex<mpsc::Sender<Handoff<T>>>>,
    rx: Rc<RefCell<Option<mpsc::Receiver<Handoff<T>>>>>,
}

impl<T> Clone for Sequencer<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> Sequencer<T> {
    pub fn new(name: &str) -> Self {
        let (tx, rx) = mpsc::channel(0);
        Self {
            name: name.to_string(),
            tx: Rc::new(Mutex::new(tx)),
            rx: Rc::new(RefCell::new(Some(rx))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hands out the driver side. There is only one.
    pub fn seq_item_port(&self) -> TbResult<SeqItemPort<T>> {
        let rx = self
            .rx
            .borrow_mut()
            .take()
            .ok_or_else(|| TbError::PortTaken(self.name.clone()))?;
        Ok(SeqItemPort {
            name: self.name.clone(),
            rx,
            outstanding: None,
        })
    }

    /// Runs `seq` to exhaustion. Returns the number of items the driver completed.
    pub async fn start(&self, seq: &mut dyn Sequence<T>) -> TbResult<usize> {
        let mut count = 0;
        debug!(sequencer = self.name.as_str(), sequence = seq.name(), "sequence started");
        loop {
            let mut tx = self.tx.lock().await;
            let Some(item) = seq.next_item() else {
                break;
            };
            let (done_tx, done_rx) = oneshot::channel();
            tx.send(Handoff { item, done: done_tx })
                .await
                .map_err(|_| TbError::SequencerClosed(self.name.clone()))?;
            done_rx
                .await
                .map_err(|_| TbError::SequencerClosed(self.name.clone()))?;
            drop(tx);
            count += 1;
        }
        debug!(sequencer = self.name.as_str(), sequence = seq.name(), count, "sequence finished");
        Ok(count)
    }
}

/// Driver side of a [`Sequencer`].
pub struct SeqItemPort<T> {
    name: String,
    rx: mpsc::Receiver<Handoff<T>>,
    outstanding: Option<oneshot::Sender<()>>,
}

impl<T> SeqItemPort<T> {
    /// Suspends until a sequence submitted the next item.
    pub async fn get_next_item(&mut self) -> TbResult<T> {
        if self.outstanding.is_some() {
            return Err(TbError::ItemOutstanding(self.name.clone()));
        }
        let handoff = self
            .rx
            .next()
            .await
            .ok_or_else(|| TbError::SequencerClosed(self.name.clone()))?;
        self.outstanding = Some(handoff.done);
        Ok(handoff.item)
    }

    /// Releases the sequence waiting on the most recent item.
    pub fn item_done(&mut self) -> TbResult<()> {
        let done = self
            .outstanding
            .take()
            .ok_or_else(|| TbError::NoItemOutstanding(self.name.clone()))?;
        // the sequence may have been dropped meanwhile, nothing left to release then
        let _ = done.send(());
        Ok(())
    }

    pub fn has_outstanding(&self) -> bool {
        self.outstanding.is_some()
    }
}
