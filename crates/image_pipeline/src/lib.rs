//! Bounded multi-stage concurrent pipeline for batch image processing.
//!
//! Reads image files from a directory, applies a per-image transform on N
//! parallel workers, and writes the results to an output directory. The
//! orchestration — staged producer/worker/writer topology, bounded hand-off
//! channels, and deterministic leak-free shutdown — lives in
//! [`pipeline`]; the filesystem and codec collaborators live behind the
//! capability traits so the core runs unchanged against in-memory fakes.
//!
//! # Example
//! ```ignore
//! // Invert every image in `photos/` into `inverted/` on 4 workers.
//! let report = image_pipeline::invert_directory("photos", "inverted", 4)?;
//! println!("{report}");
//! ```
//!
//! Custom transforms plug in the same way:
//! ```ignore
//! let report = image_pipeline::process_directory(
//!     "photos",
//!     "out",
//!     8,
//!     MyTransform.then(InvertColors),
//! )?;
//! ```

pub mod capability;
pub mod images;
pub mod pipeline;
pub mod source;
pub mod transform;

pub use capability::{Load, Persist};
pub use images::{invert_directory, process_directory, InvertColors, LoadImageFile, SaveImage};
pub use pipeline::{
    BoundedChannel, Pipeline, PipelineConfig, PipelineReport, PipelineState,
};
pub use source::{ImageDirSource, IMAGE_EXTENSIONS};
pub use transform::{Chain, Transform};
