//! Serializable configuration for a search run.

use mm_types::{ConfigError, MmResult, SearchSpace};
use serde::{Deserialize, Serialize};

use crate::agent::{AgentKind, DEFAULT_EXPLORATION_RATE};

/// What the coordinator does when the objective fails on an assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the search and return the error.
    #[default]
    Abort,
    /// Mark the assignment as evaluated but unscorable and keep going.
    Record,
}

/// Top-level configuration for a search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub name: String,

    /// The parameter search space.
    pub search_space: SearchSpace,

    /// Number of agents in the pool.
    pub num_agents: usize,

    /// Strategy name per agent index ("random" or "greedy"). Missing or
    /// unknown entries become random agents. `None` alternates
    /// random/greedy starting with random.
    pub agent_kinds: Option<Vec<String>>,

    /// Rounds to run; each round gives every agent one proposal.
    pub num_iterations: usize,

    /// Rounds between knowledge exchanges.
    pub communication_interval: usize,

    /// Exploration probability for greedy agents.
    pub exploration_rate: f64,

    /// Seed for the coordinator's RNG. `None` draws one from the OS.
    pub seed: Option<u64>,

    /// Log new bests and exchanges at info level.
    pub verbose: bool,

    pub on_evaluation_error: FailurePolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            name: "search".to_string(),
            search_space: SearchSpace::new(),
            num_agents: 4,
            agent_kinds: None,
            num_iterations: 100,
            communication_interval: 10,
            exploration_rate: DEFAULT_EXPLORATION_RATE,
            seed: None,
            verbose: false,
            on_evaluation_error: FailurePolicy::Abort,
        }
    }
}

impl SearchConfig {
    pub fn new(name: impl Into<String>, search_space: SearchSpace) -> Self {
        Self {
            name: name.into(),
            search_space,
            ..Self::default()
        }
    }

    pub fn with_agents(mut self, n: usize) -> Self {
        self.num_agents = n;
        self
    }

    pub fn with_agent_kinds<S: AsRef<str>>(mut self, kinds: &[S]) -> Self {
        self.agent_kinds = Some(kinds.iter().map(|k| k.as_ref().to_string()).collect());
        self
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.num_iterations = n;
        self
    }

    pub fn with_communication_interval(mut self, n: usize) -> Self {
        self.communication_interval = n;
        self
    }

    pub fn with_exploration_rate(mut self, rate: f64) -> Self {
        self.exploration_rate = rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_evaluation_error = policy;
        self
    }

    /// Resolved strategy for each agent index.
    pub fn agent_pool(&self) -> Vec<AgentKind> {
        AgentKind::resolve_pool(self.num_agents, self.agent_kinds.as_deref())
    }

    pub fn validate(&self) -> MmResult<()> {
        self.search_space.validate()?;
        if self.num_agents == 0 {
            return Err(ConfigError::NoAgents.into());
        }
        if self.communication_interval == 0 {
            return Err(ConfigError::InvalidCommunicationInterval.into());
        }
        if !(0.0..=1.0).contains(&self.exploration_rate) {
            return Err(ConfigError::InvalidExplorationRate {
                rate: self.exploration_rate,
            }
            .into());
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> MmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> MmResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
