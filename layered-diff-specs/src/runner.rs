//! Running fixtures and checking their expectations.

use layered_diff::{diff, DiffResult, GroupedRevisions};
use layered_diff_agreement::{cohen_kappa, AgreementResult};
use tracing::debug;

use crate::builder::build_study;
use crate::errors::SpecResult;
use crate::fixture::StudyFixture;

/// Everything a fixture run produced.
#[derive(Debug)]
pub struct FixtureRun {
    pub revisions: GroupedRevisions,
    pub result: DiffResult,
    /// Present when the fixture expects a kappa value.
    pub agreement: Option<AgreementResult>,
}

impl FixtureRun {
    /// The diff report, resolving records against the study documents.
    pub fn report(&self) -> String {
        self.result.report().with_records(&self.revisions).to_string()
    }
}

/// One expectation that did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectationFailure {
    pub check: String,
    pub expected: String,
    pub actual: String,
}

impl ExpectationFailure {
    fn new(check: impl Into<String>, expected: impl ToString, actual: impl ToString) -> Self {
        Self {
            check: check.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Build the study and diff it.
pub fn run_fixture(fixture: &StudyFixture) -> SpecResult<FixtureRun> {
    let revisions = build_study(fixture)?;
    let result = diff(
        &fixture.entry_types,
        fixture.schema.adapters(),
        &revisions,
        &fixture.options,
    )?;
    let agreement = match &fixture.expect.kappa {
        Some(kappa) => Some(cohen_kappa(
            &result,
            &kappa.type_name,
            &kappa.attribute,
            &revisions,
        )?),
        None => None,
    };
    debug!(fixture = fixture.name(), positions = result.len(), "ran fixture");
    Ok(FixtureRun {
        revisions,
        result,
        agreement,
    })
}

/// Compare a finished run against the fixture's expectations.
pub fn check_expectations(fixture: &StudyFixture, run: &FixtureRun) -> Vec<ExpectationFailure> {
    let expect = &fixture.expect;
    let result = &run.result;
    let mut failures = Vec::new();

    if let Some(error) = &expect.error {
        failures.push(ExpectationFailure::new("error", error, "no error"));
    }
    if let Some(size) = expect.size {
        if result.len() != size {
            failures.push(ExpectationFailure::new("size", size, result.len()));
        }
    }
    for (type_name, &size) in &expect.size_by_type {
        let actual = result.len_of_type(type_name);
        if actual != size {
            failures.push(ExpectationFailure::new(
                format!("size of {type_name}"),
                size,
                actual,
            ));
        }
    }
    if let Some(differing) = expect.differing {
        let actual = result.differing_configuration_sets().len();
        if actual != differing {
            failures.push(ExpectationFailure::new("differing", differing, actual));
        }
    }
    if let Some(incomplete) = expect.incomplete {
        let actual = result.incomplete_configuration_sets().len();
        if actual != incomplete {
            failures.push(ExpectationFailure::new("incomplete", incomplete, actual));
        }
    }
    if let (Some(kappa), Some(agreement)) = (&expect.kappa, &run.agreement) {
        let actual = agreement.agreement();
        if !kappa.matches(actual) {
            failures.push(ExpectationFailure::new(
                format!("kappa of {}.{}", kappa.type_name, kappa.attribute),
                kappa.describe(),
                format!("{actual:.6}"),
            ));
        }
    }

    failures
}

/// Run a fixture and check it, treating an expected error as success.
pub fn check_fixture(fixture: &StudyFixture) -> SpecResult<Vec<ExpectationFailure>> {
    match (run_fixture(fixture), &fixture.expect.error) {
        (Ok(run), _) => Ok(check_expectations(fixture, &run)),
        (Err(err), Some(expected)) => {
            let actual = err.to_string();
            if actual.contains(expected.as_str()) {
                Ok(Vec::new())
            } else {
                Ok(vec![ExpectationFailure::new("error", expected, actual)])
            }
        }
        (Err(err), None) => Err(err),
    }
}
