//! Assertion Validator - named structural checks over a generated model.
//!
//! Assertions run in declared order and every one is reported, whatever the
//! outcome of the others. A failing assertion is a result, not an error.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Result;
use crate::narrative_graph::Model;

/// Predicate over a whole model.
pub type ModelPredicate = dyn Fn(&Model) -> Result<bool> + Send + Sync;

/// A named check, typically built from the query algebra.
#[derive(Clone)]
pub struct Assertion {
    name: String,
    check: Arc<ModelPredicate>,
}

impl Assertion {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Model) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, model: &Model) -> Result<bool> {
        (self.check)(model)
    }
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Outcome of one assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionResult {
    /// 1-based position in declared order.
    pub index: usize,
    pub name: String,
    pub verdict: Verdict,
    /// Set when the check itself failed to evaluate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ordered results of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssertionReport {
    results: Vec<AssertionResult>,
}

impl AssertionReport {
    pub fn results(&self) -> &[AssertionResult] {
        &self.results
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.verdict == Verdict::Pass)
    }

    /// Results with a failing verdict.
    pub fn failures(&self) -> impl Iterator<Item = &AssertionResult> {
        self.results.iter().filter(|r| r.verdict == Verdict::Fail)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl std::fmt::Display for AssertionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for result in &self.results {
            write!(f, "[{}] {}: {}", result.index, result.name, result.verdict)?;
            if let Some(error) = &result.error {
                write!(f, " ({})", error)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Run every assertion against `model`, in the order given.
pub fn validate<'a, I>(assertions: I, model: &Model) -> AssertionReport
where
    I: IntoIterator<Item = &'a Assertion>,
{
    let mut results = Vec::new();

    for (i, assertion) in assertions.into_iter().enumerate() {
        let (verdict, error) = match assertion.check(model) {
            Ok(true) => (Verdict::Pass, None),
            Ok(false) => (Verdict::Fail, None),
            Err(err) => {
                warn!(assertion = assertion.name(), error = %err, "Assertion could not be evaluated");
                (Verdict::Fail, Some(err.to_string()))
            }
        };
        info!(index = i + 1, assertion = assertion.name(), %verdict, "Assertion checked");

        results.push(AssertionResult {
            index: i + 1,
            name: assertion.name().to_string(),
            verdict,
            error,
        });
    }

    let report = AssertionReport { results };
    info!(
        total = report.len(),
        failed = report.failures().count(),
        "Validation complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use world_model::{adjust, Choice, Context, EntityClass, State, ValueKind};

    fn model() -> Model {
        let class = EntityClass::new("counter")
            .with_property("N", ValueKind::Int, 0)
            .unwrap();
        let start = Context::new()
            .with_entity("C", &class)
            .unwrap()
            .initial_state();
        let inc = Choice::new(
            "INC",
            |s| Ok(s.int("C", "N")? < 2),
            |s| adjust(s, "C", "N", 1),
        );
        generate([start].into(), [inc].into(), vec![], None).unwrap()
    }

    fn reaches(model: &Model, value: i64) -> Result<bool> {
        for state in model.states().iter() {
            if state.int("C", "N")? == value {
                return Ok(true);
            }
        }
        Ok(false)
    }

    #[test]
    fn test_every_assertion_is_reported_in_order() {
        let assertions = vec![
            Assertion::new("reaches two", |m| reaches(m, 2)),
            Assertion::new("reaches five", |m| reaches(m, 5)),
            Assertion::new("has a dead end", |m| Ok(!m.dead_ends().is_empty())),
        ];
        let report = validate(&assertions, &model());

        let verdicts: Vec<_> = report
            .results()
            .iter()
            .map(|r| (r.index, r.verdict))
            .collect();
        assert_eq!(
            verdicts,
            vec![(1, Verdict::Pass), (2, Verdict::Fail), (3, Verdict::Pass)]
        );
        assert!(!report.all_passed());
        assert_eq!(
            report.to_string(),
            "[1] reaches two: PASS\n[2] reaches five: FAIL\n[3] has a dead end: PASS\n"
        );
    }

    #[test]
    fn test_errors_are_failures_and_validation_continues() {
        let broken = |m: &Model| -> Result<bool> {
            let states = m.states();
            let any: Option<&State> = states.iter().next();
            Ok(any.map(|s| s.bool("C", "N")).transpose()?.unwrap_or(false))
        };
        let assertions = vec![
            Assertion::new("broken", broken),
            Assertion::new("absolute termination", |m| Ok(m.has_absolute_termination())),
        ];
        let report = model().validate_assertions(&assertions);

        assert_eq!(report.len(), 2);
        assert_eq!(report.results()[0].verdict, Verdict::Fail);
        assert!(report.results()[0].error.is_some());
        assert_eq!(report.results()[1].verdict, Verdict::Pass);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_report_serializes() {
        let assertions = [Assertion::new("nodes", |m| Ok(m.states().len() == 3))];
        let report = validate(&assertions, &model());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][0]["verdict"], "PASS");
        assert!(json["results"][0].get("error").is_none());
    }
}
