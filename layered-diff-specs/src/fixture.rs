//! Study fixture types.
//!
//! A fixture is a TOML file describing one annotation study: the shared text,
//! the layers being compared, every group's revisions and what the diff is
//! expected to find.
//!
//! ```toml
//! title = "Two annotators tag four tokens"
//! text = "John loves Mary ."
//! entry_types = ["POS"]
//!
//! [[schema.layers]]
//! name = "POS"
//! features = [{ name = "PosValue" }]
//!
//! [[groups]]
//! name = "alice"
//! [[groups.revisions]]
//! tokenize = "Token"
//! tags = { type = "POS", feature = "PosValue", values = ["NNP", "VBZ", "NNP", "."] }
//!
//! [expect]
//! size = 4
//! ```

use std::collections::BTreeMap;

use layered_diff::{DiffOptions, LayerSchema};
use serde::Deserialize;

use crate::errors::{SpecError, SpecResult};

/// Record type created for each entry of a `links` feature.
pub const LINK_TYPE: &str = "Link";
/// Feature of a link record holding its role.
pub const LINK_ROLE: &str = "role";
/// Feature of a link record referencing its target.
pub const LINK_TARGET: &str = "target";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyFixture {
    pub title: Option<String>,
    pub text: String,
    pub entry_types: Vec<String>,
    #[serde(default)]
    pub schema: LayerSchema,
    #[serde(default)]
    pub options: DiffOptions,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
    #[serde(default)]
    pub expect: Expectations,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    pub name: String,
    #[serde(default)]
    pub revisions: Vec<RevisionSpec>,
}

/// One revision of a group. `absent = true` stands for a revision the group
/// never produced.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevisionSpec {
    #[serde(default)]
    pub absent: bool,
    /// Overrides the fixture text for this revision only.
    pub text: Option<String>,
    /// Token type to split the text into. Tokens get the ids `tok0`, `tok1`, ...
    pub tokenize: Option<String>,
    pub tags: Option<TagSpec>,
    #[serde(default)]
    pub records: Vec<RecordSpec>,
}

/// One `type_name` span per token, carrying `values[i]` in `feature`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagSpec {
    #[serde(rename = "type")]
    pub type_name: String,
    pub feature: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSpec {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    pub begin: Option<usize>,
    pub end: Option<usize>,
    #[serde(default)]
    pub features: BTreeMap<String, FeatureSpec>,
}

/// A feature value as written in a fixture.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FeatureSpec {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// `{ ref = "tok0" }`
    Ref {
        #[serde(rename = "ref")]
        id: String,
    },
    /// `{ refs = ["tok0", "tok1"] }`
    Refs { refs: Vec<String> },
    /// `{ links = [{ role = "agent", target = "tok0" }] }`
    Links { links: Vec<LinkSpec> },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSpec {
    pub role: String,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectations {
    pub size: Option<usize>,
    #[serde(default)]
    pub size_by_type: BTreeMap<String, usize>,
    pub differing: Option<usize>,
    pub incomplete: Option<usize>,
    pub kappa: Option<KappaExpectation>,
    /// Substring of the error message the run must fail with.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KappaExpectation {
    #[serde(rename = "type")]
    pub type_name: String,
    pub attribute: String,
    pub value: Option<f64>,
    /// The statistic is undefined for this study.
    #[serde(default)]
    pub nan: bool,
}

impl KappaExpectation {
    pub const TOLERANCE: f64 = 1e-6;

    pub fn matches(&self, actual: f64) -> bool {
        match (self.nan, self.value) {
            (true, _) => actual.is_nan(),
            (false, Some(value)) => (actual - value).abs() < Self::TOLERANCE,
            (false, None) => !actual.is_nan(),
        }
    }

    pub fn describe(&self) -> String {
        match (self.nan, self.value) {
            (true, _) => "NaN".to_string(),
            (false, Some(value)) => format!("{value:.6}"),
            (false, None) => "a number".to_string(),
        }
    }
}

impl StudyFixture {
    pub fn name(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }
}

/// Parse and check a fixture.
pub fn parse_fixture(source: &str) -> SpecResult<StudyFixture> {
    let fixture: StudyFixture = toml::from_str(source).map_err(|e| SpecError::Parse {
        message: e.to_string(),
    })?;
    fixture.schema.check()?;
    fixture.options.check()?;
    if fixture.entry_types.is_empty() {
        return Err(SpecError::Fixture {
            message: "entry_types is empty".to_string(),
        });
    }
    Ok(fixture)
}
