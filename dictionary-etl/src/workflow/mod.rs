//! Ingest workflow
//!
//! Row decoding, grouping, flattening, hierarchy building and materialization,
//! plus the concurrency plumbing that runs them:
//!
//! ```text
//! extract -> decoder -> accumulator -> queue -> dispatcher -> worker pool
//!                                                  |
//!                          flatten -> build_hierarchy -> materialize
//!                                                  |
//!                                     store  /  quarantine -> report
//! ```

pub mod accumulator;
pub mod decoder;
pub mod dispatcher;
pub mod flattener;
pub mod hierarchy;
pub mod materializer;
pub mod pipeline;
pub mod quarantine;
pub mod report;
pub mod tracker;
pub mod worker;

pub use pipeline::{IngestPipeline, IngestRequest};
