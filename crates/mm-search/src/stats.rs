//! Summary statistics exposed after (or during) a search run.

use mm_types::{Assignment, SearchSpace};
use serde::{Deserialize, Serialize};

/// Read-only snapshot of a coordinator's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStatistics {
    pub best_score: Option<f64>,
    pub best_config: Option<Assignment>,
    /// Distinct assignments consumed, including ones the objective failed on.
    pub num_evaluated: usize,
    pub num_failed: usize,
    /// Proposals dropped because their assignment was already evaluated.
    pub num_skipped: usize,
    /// Best score per agent in index order; 0 for agents without a best.
    pub agent_best_scores: Vec<f64>,
    pub iterations_run: usize,
}

impl SearchStatistics {
    /// Fraction of the full grid that has been evaluated.
    pub fn coverage(&self, space: &SearchSpace) -> Option<f64> {
        space
            .grid_size()
            .filter(|size| *size > 0)
            .map(|size| self.num_evaluated as f64 / size as f64)
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.best_score {
            Some(score) => writeln!(f, "Best score:        {score:.4}")?,
            None => writeln!(f, "Best score:        none")?,
        }
        if let Some(config) = &self.best_config {
            writeln!(f, "Best config:")?;
            for (name, value) in config {
                writeln!(f, "  {name}: {value}")?;
            }
        }
        writeln!(f, "Iterations run:    {}", self.iterations_run)?;
        writeln!(f, "Evaluated:         {}", self.num_evaluated)?;
        writeln!(f, "Failed:            {}", self.num_failed)?;
        writeln!(f, "Skipped:           {}", self.num_skipped)?;
        let scores: Vec<String> = self
            .agent_best_scores
            .iter()
            .map(|s| format!("{s:.4}"))
            .collect();
        write!(f, "Agent best scores: [{}]", scores.join(", "))
    }
}
