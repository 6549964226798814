//! # mm-search
//!
//! Multi-agent configuration search for Murmur.
//!
//! A pool of agents (uniform random and greedy single-point mutation)
//! proposes assignments from a discrete search space. The coordinator scores
//! each distinct assignment at most once, tracks the global best, and every
//! few rounds lets agents gossip their best candidates to random peers.

mod agent;
mod config;
mod coordinator;
mod exchange;
mod objective;
mod run;
mod stats;

pub use agent::{
    random_assignment, AgentCore, AgentKind, GreedyAgent, RandomAgent, SearchAgent,
    DEFAULT_EXPLORATION_RATE,
};
pub use config::{FailurePolicy, SearchConfig};
pub use coordinator::SearchCoordinator;
pub use exchange::{ExchangeReport, KnowledgeExchange};
pub use objective::{Fallible, Objective};
pub use run::{RunId, RunState, RunStatus};
pub use stats::SearchStatistics;
