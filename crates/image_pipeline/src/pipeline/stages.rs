//! Stage loops executed by the pipeline threads.
//!
//! Three loops, one per stage:
//! - `loader_stage` (single thread): identifier -> raw payload
//! - `worker_stage` (N threads, competing consumers): raw -> transformed
//! - `writer_stage` (single thread): transformed -> durable sink
//!
//! Each loop exits when its upstream channel reports drained. None of the
//! loops close a channel themselves; the coordinator closes each channel
//! only after the producing side has fully joined, which is what makes
//! termination deterministic for every worker.
//!
//! Per-item capability failures are logged, counted against the run's
//! [`StageCounters`], and skipped; they never stop the loop.

use log::{debug, warn};
use std::fmt::Debug;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::channel::BoundedChannel;
use super::report::StageCounters;
use crate::capability::{Load, Persist};
use crate::transform::Transform;

/// One successfully loaded unit of work, owned by exactly one worker.
#[derive(Debug)]
pub struct WorkItem<Id, Raw> {
    pub id: Id,
    pub payload: Raw,
}

/// One transformed result, owned by the writer until persisted.
#[derive(Debug)]
pub struct ResultItem<Id, Out> {
    pub id: Id,
    pub payload: Out,
}

/// Loads every identifier in order and forwards the successful ones.
///
/// Load failures drop the identifier (no work item is emitted) and bump
/// `load_failures`. A rejected `put` means the work channel was closed under
/// us, which only happens when the coordinator is tearing down early.
pub(crate) fn loader_stage<Id, Raw, L>(
    ids: Vec<Id>,
    load: Arc<L>,
    output: Arc<BoundedChannel<WorkItem<Id, Raw>>>,
    counters: Arc<StageCounters>,
) where
    Id: Debug,
    L: Load<Id, Raw> + ?Sized,
{
    for id in ids {
        match load.load(&id) {
            Ok(payload) => {
                counters.loaded.fetch_add(1, Ordering::Relaxed);
                if output.put(WorkItem { id, payload }).is_err() {
                    warn!("work channel closed while loading; stopping loader");
                    break;
                }
            }
            Err(e) => {
                counters.load_failures.fetch_add(1, Ordering::Relaxed);
                warn!("dropping {:?}: load failed: {:#}", id, e);
            }
        }
    }
    debug!("loader finished");
}

/// Pulls work items until the channel drains, transforming each one.
///
/// Runs on every worker thread; the workers are symmetric and compete for
/// items from the shared input channel, so results may leave here out of
/// their original identifier order.
pub(crate) fn worker_stage<Id, Raw, Out, T>(
    input: Arc<BoundedChannel<WorkItem<Id, Raw>>>,
    output: Arc<BoundedChannel<ResultItem<Id, Out>>>,
    transform: Arc<T>,
    counters: Arc<StageCounters>,
) where
    Id: Debug,
    T: Transform<Raw, Out> + ?Sized,
{
    while let Some(WorkItem { id, payload }) = input.get() {
        match transform.apply(payload) {
            Ok(out) => {
                counters.transformed.fetch_add(1, Ordering::Relaxed);
                if output.put(ResultItem { id, payload: out }).is_err() {
                    warn!("result channel closed while transforming; stopping worker");
                    break;
                }
            }
            Err(e) => {
                counters.transform_failures.fetch_add(1, Ordering::Relaxed);
                warn!("dropping {:?}: transform failed: {:#}", id, e);
            }
        }
    }
    debug!("worker drained");
}

/// Persists results until the channel drains.
///
/// A persist failure loses that item for output purposes but must not block
/// the items behind it.
pub(crate) fn writer_stage<Id, Out, P>(
    input: Arc<BoundedChannel<ResultItem<Id, Out>>>,
    persist: Arc<P>,
    counters: Arc<StageCounters>,
) where
    Id: Debug,
    P: Persist<Id, Out> + ?Sized,
{
    while let Some(ResultItem { id, payload }) = input.get() {
        match persist.persist(&id, payload) {
            Ok(()) => {
                counters.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                counters.persist_failures.fetch_add(1, Ordering::Relaxed);
                warn!("lost {:?}: persist failed: {:#}", id, e);
            }
        }
    }
    debug!("writer drained");
}
