//! Bounded worker pool for independent jobs
//!
//! Every job is spawned immediately and then waits for one of `size` permits,
//! so at most `size` jobs run at once. Results come back in completion order.
//! A panicking job is caught and reported as [`WorkerResult::Panicked`]; its
//! siblings keep running.

use futures::FutureExt;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Result of one pooled job
#[derive(Debug)]
pub enum WorkerResult<T> {
    Completed(T),
    Panicked { label: String, message: String },
}

impl<T> WorkerResult<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Panicked { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerPool {
    size: usize,
    semaphore: Arc<Semaphore>,
}

impl WorkerPool {
    /// Pool with a fixed number of workers; zero is treated as one
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            semaphore: Arc::new(Semaphore::new(size)),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `handler` over every job and wait for all of them
    pub async fn run<J, T, F, Fut>(&self, jobs: Vec<J>, handler: F) -> Vec<WorkerResult<T>>
    where
        J: Display + Send + 'static,
        T: Send + 'static,
        F: Fn(J) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let mut join_set = JoinSet::new();
        let total = jobs.len();

        for job in jobs {
            let semaphore = Arc::clone(&self.semaphore);
            let handler = Arc::clone(&handler);
            let label = job.to_string();

            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return WorkerResult::Panicked {
                            label,
                            message: "worker pool closed".to_string(),
                        }
                    }
                };
                debug!(job = %label, "Worker acquired");

                match AssertUnwindSafe(handler(job)).catch_unwind().await {
                    Ok(value) => WorkerResult::Completed(value),
                    Err(panic) => WorkerResult::Panicked {
                        label,
                        message: panic_message(panic.as_ref()),
                    },
                }
            });
        }
        debug!(jobs = total, workers = self.size, "All jobs dispatched to worker pool");

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(error = %e, "Worker task failed to join");
                    results.push(WorkerResult::Panicked {
                        label: "unknown".to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        results
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
