//! # Dataset Module
//!
//! Sinks for captioned images: one text file per image, an incrementally
//! appended CSV table and a JSON manifest written at the end of the run.

pub mod csv;
pub mod manifest;
pub mod writer;

pub use manifest::{Dataset, DatasetInfo, ImageRecord};
pub use writer::{DatasetWriter, SinkOptions};
