#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Multi-annotator diff for layered annotation documents.
//!
//! Several groups (annotators, curators) annotate the same text. A diff maps
//! every annotation to a [`Position`], gathers what each group put at that
//! position into a [`ConfigurationSet`] and reports, per position, whether the
//! groups agree and whether every group said something at all.
//!
//! ## Core Types
//!
//! - [`Document`] / [`Annotation`] - Immutable text plus annotation records
//! - [`TypeAdapter`] - Which features of a type matter, and how it is anchored
//! - [`Position`] - Alignment key, ordered for reports
//! - [`DiffResult`] - Agreement and completeness queries, printable report
//!
//! ## Example
//!
//! ```
//! use layered_diff::{diff, Annotation, DiffOptions, Document, GroupedRevisions, TypeAdapter};
//!
//! let tagged = |tag: &str| {
//!     let mut builder = Document::builder("Hello world");
//!     builder.add(Annotation::span("POS", 0, 5).with("PosValue", tag));
//!     builder.build()
//! };
//! let revisions = GroupedRevisions::new()
//!     .with_document("alice", tagged("UH"))
//!     .with_document("bob", tagged("NN"));
//!
//! let adapters = [TypeAdapter::span("POS", ["PosValue"])];
//! let result = diff(["POS"], adapters, &revisions, &DiffOptions::default()).unwrap();
//! assert_eq!(result.len(), 1);
//! assert_eq!(result.differing_configuration_sets().len(), 1);
//! assert!(result.incomplete_configuration_sets().is_empty());
//! ```

mod adapter;
mod configuration;
mod diff;
mod display;
pub mod document;
mod equality;
mod errors;
mod position;
mod result;
mod revisions;
pub mod schema;

pub use adapter::{AdapterKind, AdapterRegistry, SlotDecl, TypeAdapter};
pub use configuration::{Address, Configuration, ConfigurationSet, SlotIndex};
pub use diff::{diff, DiffEngine, DiffOptions, Validation};
pub use display::DiffReport;
pub use document::{
    Annotation, AnnotationId, Document, DocumentBuilder, RecordRef, SlotLink, TextRange, Value,
};
pub use equality::{StructuralEquality, MAX_NESTING_DEPTH};
pub use errors::DiffError;
pub use position::{Anchor, Extent, Position, PositionKind, SlotRef};
pub use result::DiffResult;
pub use revisions::GroupedRevisions;
pub use schema::LayerSchema;
