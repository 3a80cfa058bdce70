//! In-memory page document model.
//!
//! The refresher owns the document it keeps fresh: a small element tree with
//! id/class lookups and markup rendering. Fetched fragments are stored as
//! opaque markup nodes so they render verbatim.

mod document;
mod dom;

pub use document::{Document, CONTAINER_CLASS, CONTENT_SLOT_CLASS};
pub use dom::{Element, Node};

pub(crate) use dom::escape_attr;
