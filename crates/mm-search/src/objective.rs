//! The evaluation seam between the coordinator and caller-supplied scoring.

use mm_types::{Assignment, EvaluationError};

/// Scores an assignment. Higher is better.
///
/// Any `FnMut(&Assignment) -> f64` is an objective. Wrap closures that can
/// fail in [`Fallible`].
pub trait Objective {
    fn evaluate(&mut self, assignment: &Assignment) -> Result<f64, EvaluationError>;
}

impl<F> Objective for F
where
    F: FnMut(&Assignment) -> f64,
{
    fn evaluate(&mut self, assignment: &Assignment) -> Result<f64, EvaluationError> {
        Ok(self(assignment))
    }
}

/// Adapter for objectives that report their own failures.
pub struct Fallible<F>(pub F);

impl<F> Objective for Fallible<F>
where
    F: FnMut(&Assignment) -> Result<f64, EvaluationError>,
{
    fn evaluate(&mut self, assignment: &Assignment) -> Result<f64, EvaluationError> {
        (self.0)(assignment)
    }
}

/// Evaluate and reject NaN, which would break best-score ordering.
pub(crate) fn score<O: Objective + ?Sized>(
    objective: &mut O,
    assignment: &Assignment,
) -> Result<f64, EvaluationError> {
    let score = objective.evaluate(assignment)?;
    if score.is_nan() {
        return Err(EvaluationError::InvalidScore { score });
    }
    Ok(score)
}
