#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Fixture-driven testing for layered-diff.
//!
//! Each fixture is a TOML file describing a small annotation study: the
//! shared text, the layer schema, what every group annotated in each
//! revision and what the diff should find.
//!
//! ## Modules
//!
//! - [`fixture`] - Fixture types and parsing
//! - [`builder`] - Builds the study documents of a fixture
//! - [`loader`] - Fixture file loading
//! - [`runner`] - Runs fixtures and checks their expectations
//! - [`errors`] - Error types for fixture runs
//! - [`formatter`] - Failure and summary formatting

pub mod builder;
pub mod errors;
pub mod fixture;
pub mod formatter;
pub mod loader;
pub mod runner;

pub use builder::build_study;
pub use errors::{SpecError, SpecResult};
pub use fixture::{parse_fixture, Expectations, StudyFixture};
pub use formatter::{format_failure, format_summary};
pub use loader::{load_all_fixtures, load_fixture};
pub use runner::{check_expectations, check_fixture, run_fixture, ExpectationFailure, FixtureRun};
