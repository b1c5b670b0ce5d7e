//! Fixed set of workers draining a bounded queue.
//!
//! The queue is a bounded `mpsc` channel. [`WorkerPool::submit`] waits while
//! the queue is full, which is the only backpressure in the server: a slow
//! pool stalls the accept loop and new connections wait in the OS backlog.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

pub struct WorkerPool<T> {
    sender: mpsc::Sender<T>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawns `workers` tasks, each running `job` on one item at a time.
    ///
    /// Zero values are raised to one.
    pub fn start<J, Fut>(workers: usize, queue_size: usize, job: J) -> Self
    where
        J: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(queue_size.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let job = Arc::new(job);

        let workers = (0..workers.max(1))
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                let job = Arc::clone(&job);
                tokio::spawn(async move {
                    debug!(worker = id, "Worker started");
                    loop {
                        // Hold the lock only while waiting for the next item.
                        let item = receiver.lock().await.recv().await;
                        match item {
                            Some(item) => job(item).await,
                            None => break,
                        }
                    }
                    debug!(worker = id, "Worker stopped");
                })
            })
            .collect();

        Self { sender, workers }
    }

    /// Queues `item`, waiting for space if the queue is full.
    ///
    /// Fails only once every worker has gone away.
    pub async fn submit(&self, item: T) -> anyhow::Result<()> {
        self.sender
            .send(item)
            .await
            .map_err(|_| anyhow::anyhow!("worker pool has shut down"))
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Free slots left in the queue.
    pub fn available_capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Closes the queue and waits for the workers to drain it.
    pub async fn shutdown(self) {
        drop(self.sender);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}
