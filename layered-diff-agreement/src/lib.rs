//! Inter-annotator agreement over a [`layered_diff::DiffResult`].
//!
//! ## Example
//!
//! ```
//! use layered_diff::{diff, Annotation, DiffOptions, Document, GroupedRevisions, TypeAdapter};
//! use layered_diff_agreement::cohen_kappa;
//!
//! let tagged = |tags: [&str; 2]| {
//!     let mut builder = Document::builder("Hello world");
//!     builder.add(Annotation::span("POS", 0, 5).with("PosValue", tags[0]));
//!     builder.add(Annotation::span("POS", 6, 11).with("PosValue", tags[1]));
//!     builder.build()
//! };
//! let revisions = GroupedRevisions::new()
//!     .with_document("alice", tagged(["UH", "NN"]))
//!     .with_document("bob", tagged(["UH", "NN"]));
//! let adapters = [TypeAdapter::span("POS", ["PosValue"])];
//! let result = diff(["POS"], adapters, &revisions, &DiffOptions::default()).unwrap();
//!
//! let study = cohen_kappa(&result, "POS", "PosValue", &revisions).unwrap();
//! assert_eq!(study.agreement(), 1.0);
//! ```

mod errors;
mod kappa;
mod study;

pub use errors::AgreementError;
pub use kappa::ContingencyTable;
pub use study::{cohen_kappa, AgreementItem, AgreementResult};
