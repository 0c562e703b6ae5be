//! src/pipeline/mod.rs
//!
//! Bounded, three-stage concurrent pipeline.
//!
//! ```text
//!                ┌────────────┐
//!                │ identifier │  (enumerated once, ordered)
//!                │    list    │
//!                └─────┬──────┘
//!                      ↓
//!               ┌─────────────┐
//!               │   Loader    │  1 thread, Load capability
//!               └─────┬───────┘
//!                     │ WorkItem
//!                     ↓
//!             [ work channel ]   bounded, closed by coordinator
//!                     │
//!          ┌──────────┼──────────┐
//!          ↓          ↓          ↓
//!      ┌───────┐  ┌───────┐  ┌───────┐
//!      │Worker0│  │Worker1│  │WorkerN│  Transform capability,
//!      └───┬───┘  └───┬───┘  └───┬───┘  competing consumers
//!          └──────────┼──────────┘
//!                     │ ResultItem (unordered)
//!                     ↓
//!            [ result channel ]  bounded, closed by coordinator
//!                     ↓
//!               ┌─────────────┐
//!               │   Writer    │  1 thread, Persist capability
//!               └─────────────┘
//! ```
//!
//! Data flows strictly downstream. The bounded channels are the only shared
//! mutable state between threads; backpressure from their capacity keeps
//! memory use flat when one stage outpaces another. The coordinator
//! ([`Pipeline`]) sequences startup and the drain/close/join teardown that
//! terminates every worker without losing queued items.
//!
//! # Module Structure
//!
//! ```text
//! src/pipeline/
//! ├── mod.rs           # Public API exports + architecture docs
//! ├── channel.rs       # BoundedChannel with close semantics
//! ├── config.rs        # PipelineConfig and builder
//! ├── report.rs        # Per-stage failure counters and final report
//! ├── stages.rs        # Loader / worker / writer loops
//! └── coordinator.rs   # Pipeline state machine and teardown sequencing
//! ```

mod channel;
mod config;
mod coordinator;
mod report;
mod stages;

pub use channel::BoundedChannel;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use coordinator::{Pipeline, PipelineState};
pub use report::PipelineReport;
pub use stages::{ResultItem, WorkItem};
