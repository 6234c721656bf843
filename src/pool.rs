//! Fixed-size worker pool.
//!
//! Jobs go down an `mpsc` channel; workers share the receiving end behind a
//! mutex and drain the queue until the pool is joined. Each crawl job owns
//! its own crawler and trees, so workers need no synchronization beyond the
//! queue itself.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed set of worker threads draining one job queue.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: Option<mpsc::Sender<Job>>,
}

impl ThreadPool {
    /// Spawn `size` workers (minimum 1).
    #[must_use]
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let workers = (0..size.max(1))
            .map(|id| Worker::spawn(id, Arc::clone(&receiver)))
            .collect();
        Self {
            workers,
            sender: Some(sender),
        }
    }

    /// Queue a job for the next free worker.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(sender) = &self.sender {
            if sender.send(Box::new(job)).is_err() {
                tracing::warn!("job queue closed, job dropped");
            }
        }
    }

    /// Close the queue and wait for the workers to finish what remains.
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender ends every worker's recv loop once the queue
        // is drained.
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.handle.join().is_err() {
                tracing::warn!(worker = worker.id, "worker thread panicked");
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Worker {
    id: usize,
    handle: thread::JoinHandle<()>,
}

impl Worker {
    fn spawn(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) -> Self {
        let handle = thread::spawn(move || loop {
            // The guard is released before the job runs, so a panicking job
            // cannot poison the queue for its siblings.
            let job = {
                let Ok(guard) = receiver.lock() else {
                    break;
                };
                guard.recv()
            };
            match job {
                Ok(job) => job(),
                Err(_) => break, // queue closed and drained
            }
        });
        Self { id, handle }
    }
}
