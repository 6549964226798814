use thiserror::Error;

/// Main error type for Murmur
#[derive(Error, Debug)]
pub enum MmError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while validating a search setup, before any evaluation runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Search space has no parameters")]
    EmptySearchSpace,

    #[error("Parameter {name} has no allowed values")]
    EmptyParameter { name: String },

    #[error("Parameter {name} is declared more than once")]
    DuplicateParameter { name: String },

    #[error("At least one agent is required")]
    NoAgents,

    #[error("Communication interval must be at least 1")]
    InvalidCommunicationInterval,

    #[error("Exploration rate {rate} is outside [0, 1]")]
    InvalidExplorationRate { rate: f64 },
}

/// Errors produced by an objective while scoring an assignment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Evaluation failed: {message}")]
    Failed { message: String },

    #[error("Objective returned an unusable score: {score}")]
    InvalidScore { score: f64 },
}

impl EvaluationError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Result type alias for Murmur operations
pub type MmResult<T> = Result<T, MmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_into_top_level() {
        let err: MmError = ConfigError::EmptyParameter {
            name: "lr".to_string(),
        }
        .into();
        assert!(matches!(err, MmError::Config(ConfigError::EmptyParameter { .. })));
        assert_eq!(
            err.to_string(),
            "Configuration error: Parameter lr has no allowed values"
        );
    }

    #[test]
    fn evaluation_error_messages() {
        let err = EvaluationError::failed("model diverged");
        assert_eq!(err.to_string(), "Evaluation failed: model diverged");

        let err: MmError = EvaluationError::InvalidScore { score: f64::NAN }.into();
        assert!(err.to_string().starts_with("Evaluation error: Objective returned"));
    }
}
