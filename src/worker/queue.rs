//! Card Queue Module
//!
//! Bounded FIFO of pending card names with completion accounting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, MutexGuard, Notify};

use crate::error::QueueError;

// == Completion Tracker ==
/// Counts names that were enqueued but not yet completed.
#[derive(Debug, Default)]
struct Completion {
    unfinished: AtomicUsize,
    idle: Notify,
}

impl Completion {
    fn add(&self) {
        self.unfinished.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        if self.unfinished.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Provisional count for a push in progress. Released on drop unless the
/// name made it into the channel, so a cancelled push leaves no residue.
struct Reservation<'a> {
    completion: &'a Completion,
    committed: bool,
}

impl<'a> Reservation<'a> {
    fn new(completion: &'a Completion) -> Self {
        completion.add();
        Self {
            completion,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.completion.finish();
        }
    }
}

// == Queue Item ==
/// A dequeued name. Dropping it marks the name complete, exactly once, on
/// every path: processed, skipped, or abandoned by an aborted worker.
#[derive(Debug)]
pub struct QueueItem {
    name: String,
    completion: Arc<Completion>,
}

impl QueueItem {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for QueueItem {
    fn drop(&mut self) {
        self.completion.finish();
    }
}

// == Card Queue ==
/// Many producers push names; one consumer at a time drains them.
///
/// The receiving half sits behind a mutex so it outlives any single worker
/// run and queued names survive a stop/start cycle.
#[derive(Debug)]
pub struct CardQueue {
    sender: mpsc::Sender<String>,
    receiver: Mutex<mpsc::Receiver<String>>,
    completion: Arc<Completion>,
    enqueue_timeout: Duration,
}

impl CardQueue {
    pub fn new(capacity: usize, enqueue_timeout: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: Mutex::new(receiver),
            completion: Arc::new(Completion::default()),
            enqueue_timeout,
        }
    }

    /// Appends `name`, waiting up to the enqueue timeout for space.
    ///
    /// The name is counted before it becomes visible to the consumer, so a
    /// fast consumer can never complete it first.
    pub async fn push(&self, name: String) -> Result<(), QueueError> {
        let reservation = Reservation::new(&self.completion);

        match tokio::time::timeout(self.enqueue_timeout, self.sender.send(name)).await {
            Ok(Ok(())) => {
                reservation.commit();
                Ok(())
            }
            Ok(Err(_)) => Err(QueueError::Closed),
            Err(_) => Err(QueueError::Full),
        }
    }

    /// Names waiting to be dequeued.
    pub fn len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    /// Names enqueued but not yet completed, including any being processed.
    pub fn unfinished(&self) -> usize {
        self.completion.unfinished.load(Ordering::SeqCst)
    }

    /// Waits until every enqueued name has been completed.
    pub async fn join(&self) {
        loop {
            let idle = self.completion.idle.notified();
            tokio::pin!(idle);
            idle.as_mut().enable();

            if self.unfinished() == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Takes exclusive ownership of the receiving side.
    pub async fn consumer(&self) -> Consumer<'_> {
        Consumer {
            receiver: self.receiver.lock().await,
            completion: &self.completion,
        }
    }
}

// == Consumer ==
/// Exclusive dequeue handle held by the running worker.
pub struct Consumer<'a> {
    receiver: MutexGuard<'a, mpsc::Receiver<String>>,
    completion: &'a Arc<Completion>,
}

impl Consumer<'_> {
    /// Next name in FIFO order, or `None` if nothing arrives within `wait`.
    ///
    /// Cancel-safe: dropping the future never loses a name.
    pub async fn next(&mut self, wait: Duration) -> Result<Option<QueueItem>, QueueError> {
        match tokio::time::timeout(wait, self.receiver.recv()).await {
            Ok(Some(name)) => Ok(Some(QueueItem {
                name,
                completion: Arc::clone(self.completion),
            })),
            Ok(None) => Err(QueueError::Closed),
            Err(_) => Ok(None),
        }
    }
}
