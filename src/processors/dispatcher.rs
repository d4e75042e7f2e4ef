// yapt/src/processors/dispatcher.rs
use crate::core::{Result, YaptError};
use crossbeam_channel::unbounded;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Runs a per-file body over a work list on a fixed number of workers.
///
/// Every worker pulls from one shared queue until it is drained, so each
/// item is handed to exactly one worker. With zero workers the body runs
/// on the calling thread.
pub struct TaskDispatcher {
    workers: usize,
    thread_pool: Option<rayon::ThreadPool>,
    show_progress: bool,
}

impl TaskDispatcher {
    pub fn new(workers: usize) -> Result<Self> {
        let mut dispatcher = Self {
            workers,
            thread_pool: None,
            show_progress: false,
        };

        if workers > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("yapt-worker-{}", i))
                .build()
                .map_err(|e| {
                    YaptError::ProcessingError(format!("Failed to create thread pool: {}", e))
                })?;
            dispatcher.thread_pool = Some(pool);
        }

        Ok(dispatcher)
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Blocks until every item has been processed.
    pub fn run<F>(&self, items: Vec<PathBuf>, body: F)
    where
        F: Fn(&Path) + Sync,
    {
        let pb = self.create_progress_bar(items.len());

        match &self.thread_pool {
            None => {
                for item in &items {
                    body(item);
                    pb.inc(1);
                }
            }
            Some(pool) => {
                let (sender, receiver) = unbounded::<PathBuf>();
                for item in items {
                    // The receiver is alive in this scope, so sending cannot fail.
                    let _ = sender.send(item);
                }
                // Workers stop once the queue is empty and all senders are gone.
                drop(sender);

                let body = &body;
                let receiver = &receiver;
                let pb = &pb;
                pool.scope(|scope| {
                    for _ in 0..self.workers {
                        scope.spawn(move |_| {
                            while let Ok(item) = receiver.recv() {
                                body(&item);
                                pb.inc(1);
                            }
                        });
                    }
                });
            }
        }

        pb.finish_and_clear();
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb
    }
}
