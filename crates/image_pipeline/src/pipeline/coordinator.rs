//! Pipeline orchestration: thread startup, staged teardown, final report.
//!
//! The coordinator owns the three capabilities and walks one run through the
//! `Idle -> Running -> Draining -> Stopped` state machine. The teardown is
//! strictly sequenced:
//!
//! 1. join the loader (it finishes on its own once the identifiers are
//!    exhausted),
//! 2. close the work channel — every worker now drains the remaining items
//!    and then observes termination,
//! 3. join every worker,
//! 4. close the result channel,
//! 5. join the writer.
//!
//! Closing a channel only after its producing side has fully joined is what
//! rules out both failure modes of fan-out shutdown: workers can neither
//! block forever on an under-signalled channel nor exit while undelivered
//! work is still queued.

use anyhow::{anyhow, ensure, Context, Result};
use log::info;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::thread;

use super::channel::BoundedChannel;
use super::config::PipelineConfig;
use super::report::{PipelineReport, StageCounters};
use super::stages::{loader_stage, worker_stage, writer_stage, ResultItem, WorkItem};
use crate::capability::{Load, Persist};
use crate::transform::Transform;

/// Lifecycle of a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Constructed, not yet started.
    Idle,
    /// Stage threads spawned, items flowing.
    Running,
    /// Identifiers handed off; waiting stage by stage for completion.
    Draining,
    /// All threads joined, report available.
    Stopped,
}

/// A three-stage concurrent pipeline: load -> transform (xN) -> persist.
///
/// Generic over its capabilities so the orchestration can be exercised with
/// in-memory fakes; the image-backed capabilities live in [`crate::images`].
///
/// A pipeline is one-shot: `run` consumes the `Idle` state and ends in
/// `Stopped`. Re-processing the same inputs means building a new pipeline.
pub struct Pipeline<L, T, P> {
    load: Arc<L>,
    transform: Arc<T>,
    persist: Arc<P>,
    config: PipelineConfig,
    state: Mutex<PipelineState>,
}

impl<L, T, P> Pipeline<L, T, P> {
    /// Creates a pipeline from its three capabilities.
    ///
    /// Fails if the configuration is invalid (zero workers or zero channel
    /// capacity).
    pub fn new(load: L, transform: T, persist: P, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            load: Arc::new(load),
            transform: Arc::new(transform),
            persist: Arc::new(persist),
            config,
            state: Mutex::new(PipelineState::Idle),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: PipelineState) {
        *self.state.lock().unwrap() = state;
    }

    /// Runs the pipeline to completion over `ids` and returns the aggregate
    /// report.
    ///
    /// Per-item load/transform/persist failures are counted in the report,
    /// not returned as errors. `Err` is reserved for setup problems: running
    /// twice, failing to start a stage thread, or a stage thread panicking.
    pub fn run<Id, Raw, Out>(&self, ids: Vec<Id>) -> Result<PipelineReport>
    where
        Id: Debug + Send + 'static,
        Raw: Send + 'static,
        Out: Send + 'static,
        L: Load<Id, Raw> + 'static,
        T: Transform<Raw, Out> + 'static,
        P: Persist<Id, Out> + 'static,
    {
        {
            let mut state = self.state.lock().unwrap();
            ensure!(
                *state == PipelineState::Idle,
                "Pipeline already ran (state: {:?}); build a new pipeline to re-process",
                *state
            );
            *state = PipelineState::Running;
        }

        let counters = Arc::new(StageCounters::default());
        let work: Arc<BoundedChannel<WorkItem<Id, Raw>>> =
            Arc::new(BoundedChannel::new(self.config.channel_capacity)?);
        let results: Arc<BoundedChannel<ResultItem<Id, Out>>> =
            Arc::new(BoundedChannel::new(self.config.channel_capacity)?);

        info!(
            "starting pipeline: {} identifiers, {} workers, channel capacity {}",
            ids.len(),
            self.config.num_workers,
            self.config.channel_capacity
        );

        let loader = {
            let load = self.load.clone();
            let work = work.clone();
            let counters = counters.clone();
            match thread::Builder::new()
                .name("pipeline-loader".to_string())
                .spawn(move || loader_stage(ids, load, work, counters))
            {
                Ok(handle) => handle,
                Err(e) => {
                    self.set_state(PipelineState::Stopped);
                    return Err(e).context("Failed to spawn loader thread");
                }
            }
        };

        let mut workers = Vec::with_capacity(self.config.num_workers);
        let mut spawn_error = None;
        for worker_id in 0..self.config.num_workers {
            let work = work.clone();
            let results = results.clone();
            let transform = self.transform.clone();
            let counters = counters.clone();
            let spawned = thread::Builder::new()
                .name(format!("pipeline-worker-{}", worker_id))
                .spawn(move || worker_stage(work, results, transform, counters))
                .with_context(|| format!("Failed to spawn worker thread {}", worker_id));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    spawn_error = Some(e);
                    break;
                }
            }
        }

        let writer = if spawn_error.is_none() {
            let results = results.clone();
            let persist = self.persist.clone();
            let counters = counters.clone();
            match thread::Builder::new()
                .name("pipeline-writer".to_string())
                .spawn(move || writer_stage(results, persist, counters))
                .context("Failed to spawn writer thread")
            {
                Ok(handle) => Some(handle),
                Err(e) => {
                    spawn_error = Some(e);
                    None
                }
            }
        } else {
            None
        };

        if let Some(e) = spawn_error {
            // Partial startup. Close both channels and drain them so any
            // thread parked on a full put can finish, then join what did
            // start before surfacing the error.
            work.close();
            results.close();
            while work.get().is_some() {}
            let _ = loader.join();
            while results.get().is_some() {}
            for handle in workers {
                let _ = handle.join();
            }
            self.set_state(PipelineState::Stopped);
            return Err(e);
        }
        let writer = writer.ok_or_else(|| anyhow!("writer thread missing after startup"))?;

        // The identifier list is fully in the loader's hands; from here the
        // coordinator only waits and signals, stage by stage.
        self.set_state(PipelineState::Draining);

        let loader_panicked = loader.join().is_err();
        work.close();

        let mut worker_panics = 0;
        for handle in workers {
            if handle.join().is_err() {
                worker_panics += 1;
            }
        }
        results.close();

        let writer_panicked = writer.join().is_err();

        self.set_state(PipelineState::Stopped);

        ensure!(!loader_panicked, "loader thread panicked");
        ensure!(worker_panics == 0, "{} worker thread(s) panicked", worker_panics);
        ensure!(!writer_panicked, "writer thread panicked");

        let report = counters.snapshot();
        info!("pipeline stopped: {}", report);
        Ok(report)
    }
}
