//! Concurrent archive builder.
//!
//! A bounded pool of blocking workers drains a shared work-item queue. The
//! queue's lock guards only the dequeue check-and-pop; every archive build
//! runs unlocked and in parallel. `run_all` is synchronous to the caller:
//! it returns only after every worker has terminated, so every enqueued item
//! has been attempted exactly once. There is no cancellation.

use super::archive::{
    ArchiveInput, ArchiveRequest, MediaArchiver, SplitHandler, in_archive_name,
};
use super::diagnostics::Diagnostics;
use super::error::Result;
use super::payload::{CompressionLevel, PayloadFile};
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// One unit's file list plus build parameters, queued for the pool.
///
/// Immutable after enqueue; workers never mutate partitioner state.
#[derive(Debug, Clone)]
pub struct BuildWorkItem {
    /// Ordered files going into the archive.
    pub files: Vec<PayloadFile>,

    /// Path the archive is built at.
    pub destination: PathBuf,

    /// Compression level for the whole archive.
    pub compression: CompressionLevel,

    /// Optional suffix appended to every in-archive name, for merge-module
    /// identifier collision avoidance.
    pub rename_suffix: Option<String>,

    /// Size in bytes above which a single file forces volume splitting;
    /// zero leaves the archive unconstrained.
    pub large_file_threshold: u64,
}

impl BuildWorkItem {
    /// Volume-split threshold for this item.
    ///
    /// Only set when splitting is configured and some file actually exceeds
    /// the large-file size; everything else builds as a single volume.
    pub fn split_threshold(&self) -> Option<u64> {
        if self.large_file_threshold > 0
            && self
                .files
                .iter()
                .any(|f| f.size > self.large_file_threshold)
        {
            Some(self.large_file_threshold)
        } else {
            None
        }
    }

    /// Concrete backend request for this item.
    fn request(&self) -> ArchiveRequest {
        let suffix = self.rename_suffix.as_deref();
        ArchiveRequest {
            destination: self.destination.clone(),
            inputs: self
                .files
                .iter()
                .map(|f| ArchiveInput {
                    name: in_archive_name(&f.id, suffix),
                    source: f.source.clone(),
                    size: f.size,
                })
                .collect(),
            compression: self.compression,
            split_threshold: self.split_threshold(),
        }
    }
}

/// Bounded worker pool draining a shared build queue.
pub struct ArchiveBuilder {
    queue: Arc<Mutex<VecDeque<BuildWorkItem>>>,
    threads: usize,
    archiver: Arc<dyn MediaArchiver>,
    diagnostics: Diagnostics,
}

impl ArchiveBuilder {
    /// Creates an idle builder with the given pool width.
    pub fn new(threads: usize, archiver: Arc<dyn MediaArchiver>, diagnostics: Diagnostics) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            threads,
            archiver,
            diagnostics,
        }
    }

    /// Adds one work item to the queue. Call before [`Self::run_all`].
    pub fn enqueue(&self, item: BuildWorkItem) {
        lock(&self.queue).push_back(item);
    }

    /// Number of items currently queued.
    pub fn queued(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Shared diagnostic sink the workers report into.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Builds every queued item and returns once all workers have finished.
    ///
    /// Pool size is the configured thread count clamped to the queue length;
    /// an empty queue returns immediately. A worker that hits a build failure
    /// reports it to the diagnostic sink and continues with the next item;
    /// sibling workers are never aborted.
    pub async fn run_all(&self, split: Option<Arc<dyn SplitHandler>>) {
        let queued = self.queued();
        let workers = self.threads.min(queued);
        if workers == 0 {
            return;
        }
        log::info!("building {queued} archive(s) on {workers} worker(s)");

        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let queue = Arc::clone(&self.queue);
            let archiver = Arc::clone(&self.archiver);
            let diagnostics = self.diagnostics.clone();
            let split = split.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                drain_queue(worker, &queue, archiver.as_ref(), &diagnostics, split.as_deref());
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                self.diagnostics
                    .error(format!("archive build worker terminated abnormally: {e}"));
            }
        }
    }
}

/// Worker loop: pop one item under the lock, build it unlocked, repeat.
fn drain_queue(
    worker: usize,
    queue: &Mutex<VecDeque<BuildWorkItem>>,
    archiver: &dyn MediaArchiver,
    diagnostics: &Diagnostics,
    split: Option<&dyn SplitHandler>,
) {
    loop {
        let item = {
            let mut queue = lock(queue);
            match queue.pop_front() {
                Some(item) => item,
                None => break,
            }
        };

        let destination = item.destination.clone();
        match catch_unwind(AssertUnwindSafe(|| build_item(archiver, &item, split))) {
            Ok(Ok(())) => {
                log::debug!("worker {worker} built {}", destination.display());
            }
            Ok(Err(e)) => diagnostics.error(format!(
                "failed to build archive {}: {e}",
                destination.display()
            )),
            Err(_) => diagnostics.error(format!(
                "building archive {} panicked; remaining items continue",
                destination.display()
            )),
        }
    }
}

fn build_item(
    archiver: &dyn MediaArchiver,
    item: &BuildWorkItem,
    split: Option<&dyn SplitHandler>,
) -> Result<()> {
    archiver.build(&item.request(), split)
}

/// A poisoned queue lock only means a worker panicked mid-pop; the remaining
/// items are still well-formed and must be attempted.
fn lock(queue: &Mutex<VecDeque<BuildWorkItem>>) -> MutexGuard<'_, VecDeque<BuildWorkItem>> {
    match queue.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
