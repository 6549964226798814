//! Search agents: the proposal/update contract and its Random and Greedy variants.

use mm_types::{Assignment, Candidate, ConfigError, MmResult, SearchSpace};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default probability that a greedy agent ignores its incumbent.
pub const DEFAULT_EXPLORATION_RATE: f64 = 0.3;

/// Which proposal strategy an agent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Random,
    Greedy,
}

impl AgentKind {
    /// Parse a strategy name. Unknown names fall back to `Random`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "random" => Self::Random,
            "greedy" => Self::Greedy,
            other => {
                warn!("Unknown agent strategy '{}', using random", other);
                Self::Random
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Greedy => "greedy",
        }
    }

    /// Strategy for each agent index: the explicit list where it has an
    /// entry, otherwise Random/Greedy alternating from Random.
    pub fn resolve_pool<S: AsRef<str>>(num_agents: usize, explicit: Option<&[S]>) -> Vec<Self> {
        (0..num_agents)
            .map(|i| match explicit {
                Some(names) => names
                    .get(i)
                    .map(|n| Self::from_name(n.as_ref()))
                    .unwrap_or(Self::Random),
                None if i % 2 == 1 => Self::Greedy,
                None => Self::Random,
            })
            .collect()
    }

    pub fn build(
        self,
        agent_id: usize,
        space: Arc<SearchSpace>,
        exploration_rate: f64,
    ) -> MmResult<Box<dyn SearchAgent>> {
        let agent: Box<dyn SearchAgent> = match self {
            Self::Random => Box::new(RandomAgent::new(agent_id, space)?),
            Self::Greedy => Box::new(
                GreedyAgent::new(agent_id, space)?.with_exploration_rate(exploration_rate)?,
            ),
        };
        Ok(agent)
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State every agent carries regardless of strategy.
#[derive(Debug, Clone)]
pub struct AgentCore {
    pub agent_id: usize,
    space: Arc<SearchSpace>,
    best: Option<Arc<Candidate>>,
    history: Vec<Arc<Candidate>>,
}

impl AgentCore {
    pub fn new(agent_id: usize, space: Arc<SearchSpace>) -> MmResult<Self> {
        space.validate()?;
        Ok(Self {
            agent_id,
            space,
            best: None,
            history: Vec::new(),
        })
    }

    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    pub fn best(&self) -> Option<&Arc<Candidate>> {
        self.best.as_ref()
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best.as_ref().and_then(|c| c.score())
    }

    pub fn history(&self) -> &[Arc<Candidate>] {
        &self.history
    }

    /// Score, freeze and append `candidate`; it becomes the best only on a
    /// strict improvement, so ties keep the earlier find.
    pub fn record(&mut self, mut candidate: Candidate, score: f64) -> Arc<Candidate> {
        candidate.record_score(score);
        let effective = candidate.score().unwrap_or(score);
        let candidate = Arc::new(candidate);
        self.history.push(Arc::clone(&candidate));

        if self.best_score().map_or(true, |best| effective > best) {
            debug!(
                "Agent {} new personal best {:.4}: {}",
                self.agent_id, effective, candidate
            );
            self.best = Some(Arc::clone(&candidate));
        }
        candidate
    }

    /// Adopt a peer's candidate if it strictly beats the current best.
    /// An agent with no best yet never adopts.
    pub fn accept(&mut self, offered: &Arc<Candidate>) -> bool {
        match (offered.score(), self.best_score()) {
            (Some(incoming), Some(current)) if incoming > current => {
                self.best = Some(Arc::clone(offered));
                true
            }
            _ => false,
        }
    }
}

/// Draw every parameter independently and uniformly.
pub fn random_assignment(space: &SearchSpace, rng: &mut dyn RngCore) -> Assignment {
    let mut assignment = Assignment::new();
    for param in &space.parameters {
        if let Some(value) = param.values.choose(rng) {
            assignment.insert(param.name.clone(), value.clone());
        }
    }
    assignment
}

/// Common trait for all search agents.
pub trait SearchAgent: Send + Sync + std::fmt::Debug {
    fn core(&self) -> &AgentCore;

    fn core_mut(&mut self) -> &mut AgentCore;

    fn kind(&self) -> AgentKind;

    /// Produce an unscored candidate drawn from the search space.
    fn propose(&self, rng: &mut dyn RngCore) -> Candidate;

    fn agent_id(&self) -> usize {
        self.core().agent_id
    }

    fn best(&self) -> Option<&Arc<Candidate>> {
        self.core().best()
    }

    fn history(&self) -> &[Arc<Candidate>] {
        self.core().history()
    }

    /// Record the evaluation of a candidate this agent proposed.
    fn update(&mut self, candidate: Candidate, score: f64) -> Arc<Candidate> {
        self.core_mut().record(candidate, score)
    }

    /// Push this agent's best onto `other` if it is strictly better there.
    fn share_knowledge(&self, other: &mut dyn SearchAgent) -> bool {
        match self.best() {
            Some(best) => other.accept_shared(best),
            None => false,
        }
    }

    fn accept_shared(&mut self, offered: &Arc<Candidate>) -> bool {
        self.core_mut().accept(offered)
    }
}

// ---- Random agent ----

/// Memoryless agent that samples the whole space uniformly.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    core: AgentCore,
}

impl RandomAgent {
    pub fn new(agent_id: usize, space: Arc<SearchSpace>) -> MmResult<Self> {
        Ok(Self {
            core: AgentCore::new(agent_id, space)?,
        })
    }
}

impl SearchAgent for RandomAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Random
    }

    fn propose(&self, rng: &mut dyn RngCore) -> Candidate {
        Candidate::new(random_assignment(self.core.space(), rng))
    }
}

// ---- Greedy agent ----

/// Agent that mostly perturbs its incumbent by one parameter.
///
/// With probability `exploration_rate`, or while it has no best yet, it
/// samples the whole space like [`RandomAgent`].
#[derive(Debug, Clone)]
pub struct GreedyAgent {
    core: AgentCore,
    exploration_rate: f64,
}

impl GreedyAgent {
    pub fn new(agent_id: usize, space: Arc<SearchSpace>) -> MmResult<Self> {
        Ok(Self {
            core: AgentCore::new(agent_id, space)?,
            exploration_rate: DEFAULT_EXPLORATION_RATE,
        })
    }

    pub fn with_exploration_rate(mut self, rate: f64) -> MmResult<Self> {
        self.set_exploration_rate(rate)?;
        Ok(self)
    }

    pub fn set_exploration_rate(&mut self, rate: f64) -> MmResult<()> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidExplorationRate { rate }.into());
        }
        self.exploration_rate = rate;
        Ok(())
    }

    /// Copy the incumbent and redraw a single parameter. The redrawn value
    /// may equal the current one.
    fn mutate(&self, incumbent: &Candidate, rng: &mut dyn RngCore) -> Candidate {
        let mut assignment = incumbent.assignment().clone();
        if let Some(param) = self.core.space().parameters.choose(rng) {
            if let Some(value) = param.values.choose(rng) {
                assignment.insert(param.name.clone(), value.clone());
            }
        }
        Candidate::new(assignment)
    }
}

impl SearchAgent for GreedyAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Greedy
    }

    fn propose(&self, rng: &mut dyn RngCore) -> Candidate {
        match self.core.best() {
            Some(best) if rng.random::<f64>() >= self.exploration_rate => self.mutate(best, rng),
            _ => Candidate::new(random_assignment(self.core.space(), rng)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mm_types::{MmError, ParameterValue};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn space() -> Arc<SearchSpace> {
        Arc::new(
            SearchSpace::new()
                .add_ints("param1", &[1, 2, 3])
                .add_texts("param2", &["a", "b", "c"]),
        )
    }

    fn assignment(p1: i64, p2: &str) -> Assignment {
        let mut a = Assignment::new();
        a.insert("param1".into(), ParameterValue::Int(p1));
        a.insert("param2".into(), p2.into());
        a
    }

    #[test]
    fn random_agent_proposals_stay_in_space() {
        let space = space();
        let agent = RandomAgent::new(0, Arc::clone(&space)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..50 {
            let candidate = agent.propose(&mut rng);
            assert!(space.contains(candidate.assignment()));
            assert!(!candidate.is_scored());
        }
    }

    #[test]
    fn update_records_score_history_and_best() {
        let mut agent = RandomAgent::new(0, space()).unwrap();
        let recorded = agent.update(Candidate::new(assignment(1, "a")), 0.8);

        assert_eq!(recorded.score(), Some(0.8));
        assert_eq!(agent.history().len(), 1);
        assert!(Arc::ptr_eq(agent.best().unwrap(), &recorded));
    }

    #[test]
    fn ties_keep_the_earlier_best() {
        let mut agent = RandomAgent::new(0, space()).unwrap();
        let first = agent.update(Candidate::new(assignment(1, "a")), 0.5);
        agent.update(Candidate::new(assignment(2, "b")), 0.5);
        agent.update(Candidate::new(assignment(3, "c")), 0.2);

        assert!(Arc::ptr_eq(agent.best().unwrap(), &first));
        assert_eq!(agent.history().len(), 3);
    }

    #[test]
    fn best_score_never_decreases() {
        let mut agent = GreedyAgent::new(0, space()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut last = f64::NEG_INFINITY;

        for step in 0..30 {
            let candidate = agent.propose(&mut rng);
            let score = ((step * 37) % 11) as f64 / 10.0;
            agent.update(candidate, score);
            let best = agent.core().best_score().unwrap();
            assert!(best >= last);
            assert!(best >= score);
            last = best;
        }
    }

    #[test]
    fn greedy_without_exploration_mutates_one_parameter() {
        let space = space();
        let mut agent = GreedyAgent::new(0, Arc::clone(&space))
            .unwrap()
            .with_exploration_rate(0.0)
            .unwrap();
        let incumbent = agent.update(Candidate::new(assignment(2, "b")), 0.9);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..50 {
            let proposal = agent.propose(&mut rng);
            let differing = proposal
                .assignment()
                .iter()
                .filter(|(k, v)| incumbent.assignment().get(*k) != Some(*v))
                .count();
            assert!(differing <= 1, "proposal {proposal} moved {differing} keys");
            assert!(space.contains(proposal.assignment()), "{proposal} left the space");
        }
    }

    #[test]
    fn greedy_explores_before_it_has_a_best() {
        let space = space();
        let agent = GreedyAgent::new(1, Arc::clone(&space))
            .unwrap()
            .with_exploration_rate(0.0)
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..20 {
            assert!(space.contains(agent.propose(&mut rng).assignment()));
        }
    }

    #[test]
    fn exploration_rate_is_validated() {
        let err = GreedyAgent::new(0, space())
            .unwrap()
            .with_exploration_rate(1.5)
            .unwrap_err();
        assert!(matches!(
            err,
            MmError::Config(ConfigError::InvalidExplorationRate { .. })
        ));
    }

    #[test]
    fn agents_reject_invalid_space() {
        let space = Arc::new(SearchSpace::new().add_ints("x", &[]));
        assert!(RandomAgent::new(0, Arc::clone(&space)).is_err());
        assert!(GreedyAgent::new(0, space).is_err());
    }

    #[test]
    fn share_knowledge_moves_better_best_only() {
        let mut strong = RandomAgent::new(0, space()).unwrap();
        let mut weak = RandomAgent::new(1, space()).unwrap();
        let good = strong.update(Candidate::new(assignment(1, "a")), 0.9);
        let poor = weak.update(Candidate::new(assignment(2, "b")), 0.5);

        assert!(!weak.share_knowledge(&mut strong));
        assert!(Arc::ptr_eq(strong.best().unwrap(), &good));

        assert!(strong.share_knowledge(&mut weak));
        assert!(Arc::ptr_eq(weak.best().unwrap(), &good));
        // History is untouched by sharing.
        assert_eq!(weak.history().len(), 1);
        assert!(Arc::ptr_eq(&weak.history()[0], &poor));
    }

    #[test]
    fn share_knowledge_needs_both_bests() {
        let mut sender = RandomAgent::new(0, space()).unwrap();
        let mut empty = GreedyAgent::new(1, space()).unwrap();
        sender.update(Candidate::new(assignment(3, "c")), 0.7);

        assert!(!sender.share_knowledge(&mut empty));
        assert!(empty.best().is_none());
    }

    #[test]
    fn pool_defaults_alternate_from_random() {
        let pool = AgentKind::resolve_pool::<&str>(5, None);
        assert_eq!(
            pool,
            vec![
                AgentKind::Random,
                AgentKind::Greedy,
                AgentKind::Random,
                AgentKind::Greedy,
                AgentKind::Random,
            ]
        );
    }

    #[test]
    fn pool_pads_short_lists_and_tolerates_typos() {
        let pool = AgentKind::resolve_pool(4, Some(&["greedy", "gredy", "GREEDY"][..]));
        assert_eq!(
            pool,
            vec![
                AgentKind::Greedy,
                AgentKind::Random,
                AgentKind::Greedy,
                AgentKind::Random,
            ]
        );
    }

    #[test]
    fn build_produces_requested_kind() {
        let agent = AgentKind::Greedy.build(3, space(), 0.1).unwrap();
        assert_eq!(agent.kind(), AgentKind::Greedy);
        assert_eq!(agent.agent_id(), 3);
        assert!(AgentKind::Greedy.build(0, space(), -0.1).is_err());
    }
}
