//! Randomized pairwise gossip of each agent's best candidate.

use rand::seq::index;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::SearchAgent;

/// Outcome of one exchange round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeReport {
    /// Number of `share_knowledge` calls made.
    pub offers: usize,
    /// Number of offers that replaced the receiver's best.
    pub transfers: usize,
}

/// Gossip protocol: every agent, in index order, pushes its best onto a
/// random non-empty subset of the other agents.
///
/// This is not a broadcast. One round need not carry the global best to
/// every agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnowledgeExchange;

impl KnowledgeExchange {
    pub fn run(&self, agents: &mut [Box<dyn SearchAgent>], rng: &mut dyn RngCore) -> ExchangeReport {
        let n = agents.len();
        let mut report = ExchangeReport::default();
        if n < 2 {
            return report;
        }

        for sender in 0..n {
            let fanout = rng.random_range(1..n);
            // Sample among the n-1 others, then skip over the sender's slot.
            for slot in index::sample(rng, n - 1, fanout) {
                let receiver = if slot >= sender { slot + 1 } else { slot };
                let (from, to) = pair_mut(agents, sender, receiver);
                report.offers += 1;
                if from.share_knowledge(&mut **to) {
                    report.transfers += 1;
                    debug!(
                        "Agent {} shared best {:?} with agent {}",
                        from.agent_id(),
                        from.best().and_then(|c| c.score()),
                        to.agent_id()
                    );
                }
            }
        }

        report
    }
}

/// Disjoint borrows of two distinct agents.
fn pair_mut(
    agents: &mut [Box<dyn SearchAgent>],
    a: usize,
    b: usize,
) -> (&mut Box<dyn SearchAgent>, &mut Box<dyn SearchAgent>) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = agents.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = agents.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{GreedyAgent, RandomAgent};
    use mm_types::{Assignment, Candidate, SearchSpace};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn space() -> Arc<SearchSpace> {
        Arc::new(SearchSpace::new().add_ints("x", &[1, 2, 3, 4, 5]))
    }

    fn scored_agents(scores: &[f64]) -> Vec<Box<dyn SearchAgent>> {
        scores
            .iter()
            .enumerate()
            .map(|(i, score)| {
                let mut agent: Box<dyn SearchAgent> = if i % 2 == 0 {
                    Box::new(RandomAgent::new(i, space()).unwrap())
                } else {
                    Box::new(GreedyAgent::new(i, space()).unwrap())
                };
                let mut assignment = Assignment::new();
                assignment.insert("x".into(), (i as i64 + 1).into());
                agent.update(Candidate::new(assignment), *score);
                agent
            })
            .collect()
    }

    #[test]
    fn single_agent_does_not_exchange() {
        let mut agents = scored_agents(&[0.4]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            KnowledgeExchange.run(&mut agents, &mut rng),
            ExchangeReport::default()
        );
    }

    #[test]
    fn two_agents_always_exchange_with_each_other() {
        let mut agents = scored_agents(&[0.9, 0.5]);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let report = KnowledgeExchange.run(&mut agents, &mut rng);

        assert_eq!(report.offers, 2);
        assert_eq!(report.transfers, 1);
        assert!(Arc::ptr_eq(
            agents[0].best().unwrap(),
            agents[1].best().unwrap()
        ));
    }

    #[test]
    fn exchange_never_lowers_a_best() {
        let scores = [0.1, 0.7, 0.3, 0.95, 0.2, 0.6];
        let mut agents = scored_agents(&scores);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        for _ in 0..5 {
            let before: Vec<f64> = agents
                .iter()
                .map(|a| a.core().best_score().unwrap())
                .collect();
            let report = KnowledgeExchange.run(&mut agents, &mut rng);
            assert!(report.offers >= agents.len());
            assert!(report.offers <= agents.len() * (agents.len() - 1));

            for (agent, previous) in agents.iter().zip(before) {
                let now = agent.core().best_score().unwrap();
                assert!(now >= previous);
                assert!(now <= 0.95);
            }
        }
    }

    #[test]
    fn repeated_rounds_spread_the_global_best() {
        let mut agents = scored_agents(&[0.1, 0.2, 0.3, 0.99, 0.4]);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..50 {
            KnowledgeExchange.run(&mut agents, &mut rng);
        }
        for agent in &agents {
            assert_eq!(agent.core().best_score(), Some(0.99));
        }
    }

    #[test]
    fn agents_without_best_are_skipped() {
        let mut agents: Vec<Box<dyn SearchAgent>> = vec![
            Box::new(RandomAgent::new(0, space()).unwrap()),
            Box::new(RandomAgent::new(1, space()).unwrap()),
            Box::new(GreedyAgent::new(2, space()).unwrap()),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let report = KnowledgeExchange.run(&mut agents, &mut rng);
        assert_eq!(report.transfers, 0);
        assert!(agents.iter().all(|a| a.best().is_none()));
    }
}
