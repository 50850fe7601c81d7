//! Core type definitions for the labeling workflow
//!
//! - [`MediaKind`] / [`MediaItem`]: what the enumerator finds on disk
//! - [`AnnotationRecord`] / [`Summary`]: rows of the annotation store
//! - [`CategoryTaxonomy`]: the fixed group -> label set
//! - [`Frame`]: a displayable 8-bit grayscale image

mod frame;
mod media;
mod record;
mod taxonomy;

pub use frame::Frame;
pub use media::{MediaItem, MediaKind};
pub use record::{AnnotationRecord, Summary, SummaryRow, UNCLASSIFIED};
pub use taxonomy::{CategoryGroup, CategoryTaxonomy};
