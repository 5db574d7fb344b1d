//! Timing reconciliation and load balancing of test files across CI nodes.
//!
//! The pipeline is pure and synchronous:
//!
//! 1. [`InputFileSet`] normalises the file list handed in by the pipeline.
//! 2. [`reconcile`] merges historical [`TestRecord`]s into a [`FileTiming`]
//!    aligned with that file list.
//! 3. [`partition`] spreads the timed files over N [`Bucket`]s with a
//!    minimum-load greedy assignment.

pub mod input;
pub mod partition;
pub mod timing;

pub use input::InputFileSet;
pub use partition::{partition, Bucket, Partition, PartitionOrder};
pub use timing::{reconcile, FileTiming, TestRecord};
