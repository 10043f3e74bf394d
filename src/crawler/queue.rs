//! Bounded local work queue with a join barrier
//!
//! The loader pushes one batch of URLs, then waits on [`WorkQueue::join`] until every
//! pushed item has been marked done. Workers pull items with a bounded wait. An item is
//! marked done when its [`Ticket`] drops, so a worker that panics mid-item still
//! releases the barrier.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Notify};

/// An item on the local queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Crawl this URL
    Crawl(String),

    /// Stop sentinel: the worker that takes it exits
    Stop,
}

/// Outcome of waiting for an item
pub enum Poll<'a> {
    /// An item was taken
    Ready(Ticket<'a>),

    /// Nothing arrived within the wait
    Idle,
}

/// A taken item; marks it done on drop
pub struct Ticket<'a> {
    job: Job,
    queue: &'a WorkQueue,
}

impl Ticket<'_> {
    pub fn job(&self) -> &Job {
        &self.job
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.queue.task_done();
    }
}

/// Bounded multi-consumer FIFO with an unfinished-item counter
pub struct WorkQueue {
    sender: mpsc::Sender<Job>,
    receiver: Mutex<mpsc::Receiver<Job>>,
    unfinished: AtomicUsize,
    drained: Notify,
}

impl WorkQueue {
    /// Creates a queue holding at most `capacity` items
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: Mutex::new(receiver),
            unfinished: AtomicUsize::new(0),
            drained: Notify::new(),
        }
    }

    /// Pushes an item, waiting while the queue is full
    ///
    /// Returns false if the queue has been closed.
    pub async fn put(&self, job: Job) -> bool {
        let Ok(permit) = self.sender.reserve().await else {
            return false;
        };
        // Counted before it becomes visible, so join never sees a taken item as absent
        self.unfinished.fetch_add(1, Ordering::SeqCst);
        permit.send(job);
        true
    }

    /// Takes the next item, waiting at most `wait`
    pub async fn get(&self, wait: Duration) -> Poll<'_> {
        let next = tokio::time::timeout(wait, async {
            let mut receiver = self.receiver.lock().await;
            receiver.recv().await
        })
        .await;

        match next {
            Ok(Some(job)) => Poll::Ready(Ticket { job, queue: self }),
            // The queue holds its own sender, so the channel never reports closed
            Ok(None) | Err(_) => Poll::Idle,
        }
    }

    /// Number of items pushed but not yet marked done
    pub fn unfinished(&self) -> usize {
        self.unfinished.load(Ordering::SeqCst)
    }

    /// Waits until every pushed item has been marked done
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.unfinished() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn task_done(&self) {
        if self.unfinished.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }
}
