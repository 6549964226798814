//! The search coordinator: owns the agent pool, the global evaluated set and
//! the global best, and drives the propose/evaluate/exchange loop.

use mm_types::{Candidate, CandidateId, ConfigError, MmResult, SearchSpace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::agent::SearchAgent;
use crate::config::{FailurePolicy, SearchConfig};
use crate::exchange::KnowledgeExchange;
use crate::objective::{self, Objective};
use crate::run::RunStatus;
use crate::stats::SearchStatistics;

pub struct SearchCoordinator<O> {
    config: SearchConfig,
    objective: O,
    agents: Vec<Box<dyn SearchAgent>>,
    exchange: KnowledgeExchange,
    evaluated: HashSet<CandidateId>,
    global_best: Option<Arc<Candidate>>,
    iterations_run: usize,
    num_failed: usize,
    num_skipped: usize,
    rng: ChaCha8Rng,
    status: RunStatus,
}

impl<O: Objective> SearchCoordinator<O> {
    /// Build a coordinator with default run settings.
    ///
    /// `agent_kinds` names a strategy per agent index; see
    /// [`AgentKind::resolve_pool`](crate::AgentKind::resolve_pool).
    pub fn new(
        search_space: SearchSpace,
        objective: O,
        num_agents: usize,
        agent_kinds: Option<&[&str]>,
    ) -> MmResult<Self> {
        let mut config = SearchConfig::new("search", search_space).with_agents(num_agents);
        if let Some(kinds) = agent_kinds {
            config = config.with_agent_kinds(kinds);
        }
        Self::from_config(config, objective)
    }

    pub fn from_config(config: SearchConfig, objective: O) -> MmResult<Self> {
        config.validate()?;

        let space = Arc::new(config.search_space.clone());
        let agents = config
            .agent_pool()
            .into_iter()
            .enumerate()
            .map(|(agent_id, kind)| {
                kind.build(agent_id, Arc::clone(&space), config.exploration_rate)
            })
            .collect::<MmResult<Vec<_>>>()?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::seed_from_u64(rand::random()),
        };

        info!(
            "Created coordinator '{}' with {} agents over {} parameters",
            config.name,
            agents.len(),
            space.len()
        );

        Ok(Self {
            config,
            objective,
            agents,
            exchange: KnowledgeExchange,
            evaluated: HashSet::new(),
            global_best: None,
            iterations_run: 0,
            num_failed: 0,
            num_skipped: 0,
            rng,
            status: RunStatus::new(),
        })
    }

    /// Re-seed the RNG so the remaining run is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Run with the iteration settings from the stored configuration.
    pub fn run(&mut self) -> MmResult<Option<Arc<Candidate>>> {
        self.search(
            self.config.num_iterations,
            self.config.communication_interval,
            self.config.verbose,
        )
    }

    /// Run `num_iterations` rounds and return the best candidate so far.
    ///
    /// Knowledge exchange fires whenever the total number of completed
    /// rounds is a multiple of `communication_interval`. Calling this again
    /// continues the same run: the evaluated set, agent bests, the global
    /// best and the round counter carry over. The result is `None` when
    /// nothing has been scored yet.
    pub fn search(
        &mut self,
        num_iterations: usize,
        communication_interval: usize,
        verbose: bool,
    ) -> MmResult<Option<Arc<Candidate>>> {
        if communication_interval == 0 {
            return Err(ConfigError::InvalidCommunicationInterval.into());
        }

        self.status.mark_running();
        info!(
            "Starting search '{}': {} agents, {} iterations, exchange every {}",
            self.config.name,
            self.agents.len(),
            num_iterations,
            communication_interval
        );

        for _ in 0..num_iterations {
            if let Err(err) = self.run_round(verbose) {
                error!("Search '{}' aborted: {}", self.config.name, err);
                self.status.mark_failed(err.to_string());
                return Err(err);
            }
            self.iterations_run += 1;

            if self.iterations_run % communication_interval == 0 {
                let report = self.exchange.run(&mut self.agents, &mut self.rng);
                let best = self.best_score_label();
                if verbose {
                    info!(
                        "Iteration {}: agents shared knowledge ({} of {} offers adopted), best score {}",
                        self.iterations_run, report.transfers, report.offers, best
                    );
                } else {
                    debug!(
                        "Iteration {}: agents shared knowledge ({} of {} offers adopted), best score {}",
                        self.iterations_run, report.transfers, report.offers, best
                    );
                }
            }
        }

        self.status.mark_completed();
        info!(
            "Search '{}' completed: {} evaluated, best score {}",
            self.config.name,
            self.evaluated.len(),
            self.best_score_label()
        );
        Ok(self.global_best.clone())
    }

    /// One proposal per agent, in agent index order.
    fn run_round(&mut self, verbose: bool) -> MmResult<()> {
        let round = self.iterations_run + 1;
        for idx in 0..self.agents.len() {
            let proposal = self.agents[idx].propose(&mut self.rng);
            let id = proposal.id();

            if self.evaluated.contains(&id) {
                self.num_skipped += 1;
                debug!("Agent {} proposed already-evaluated {}", idx, id);
                continue;
            }

            let score = match objective::score(&mut self.objective, proposal.assignment()) {
                Ok(score) => score,
                Err(err) => match self.config.on_evaluation_error {
                    FailurePolicy::Abort => return Err(err.into()),
                    FailurePolicy::Record => {
                        warn!("Agent {}: {} is unscorable: {}", idx, proposal, err);
                        self.evaluated.insert(id);
                        self.num_failed += 1;
                        continue;
                    }
                },
            };

            let candidate = self.agents[idx].update(proposal, score);
            self.evaluated.insert(id);
            let score = candidate.score().unwrap_or(score);

            let improved = self
                .global_best
                .as_ref()
                .and_then(|best| best.score())
                .map_or(true, |best| score > best);
            if improved {
                if verbose {
                    info!(
                        "Iteration {}, agent {}: new best score {:.4} {}",
                        round, idx, score, candidate
                    );
                } else {
                    debug!(
                        "Iteration {}, agent {}: new best score {:.4} {}",
                        round, idx, score, candidate
                    );
                }
                self.global_best = Some(candidate);
            }
        }
        Ok(())
    }

    fn best_score_label(&self) -> String {
        match self.global_best.as_ref().and_then(|b| b.score()) {
            Some(score) => format!("{score:.4}"),
            None => "none".to_string(),
        }
    }

    pub fn statistics(&self) -> SearchStatistics {
        SearchStatistics {
            best_score: self.global_best.as_ref().and_then(|b| b.score()),
            best_config: self.global_best.as_ref().map(|b| b.assignment().clone()),
            num_evaluated: self.evaluated.len(),
            num_failed: self.num_failed,
            num_skipped: self.num_skipped,
            agent_best_scores: self
                .agents
                .iter()
                .map(|a| a.core().best_score().unwrap_or(0.0))
                .collect(),
            iterations_run: self.iterations_run,
        }
    }

    pub fn agents(&self) -> &[Box<dyn SearchAgent>] {
        &self.agents
    }

    pub fn global_best(&self) -> Option<&Arc<Candidate>> {
        self.global_best.as_ref()
    }

    pub fn evaluated_count(&self) -> usize {
        self.evaluated.len()
    }

    pub fn has_evaluated(&self, id: CandidateId) -> bool {
        self.evaluated.contains(&id)
    }

    pub fn iterations_run(&self) -> usize {
        self.iterations_run
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

impl<O> std::fmt::Debug for SearchCoordinator<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCoordinator")
            .field("config", &self.config)
            .field("agents", &self.agents)
            .field("evaluated", &self.evaluated.len())
            .field("global_best", &self.global_best)
            .field("iterations_run", &self.iterations_run)
            .field("status", &self.status)
            .finish()
    }
}
