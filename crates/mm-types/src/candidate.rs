//! Candidates and their order-independent identity.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};
use tracing::warn;

use crate::space::{Assignment, ParameterValue};

/// Canonical fingerprint of an [`Assignment`], used for deduplication.
///
/// Collisions are treated as equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl CandidateId {
    pub fn of(assignment: &Assignment) -> Self {
        let mut hasher = DefaultHasher::new();
        canonical_key(assignment).hash(&mut hasher);
        Self(hasher.finish())
    }
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Deterministic text encoding of an assignment with keys in sorted order.
///
/// Each value carries a type marker so `Int(2)` and `Float(2.0)` never encode
/// the same way.
pub fn canonical_key(assignment: &Assignment) -> String {
    let mut out = String::new();
    for (name, value) in assignment {
        let (marker, text) = match value {
            ParameterValue::Bool(v) => ('b', v.to_string()),
            ParameterValue::Int(v) => ('i', v.to_string()),
            ParameterValue::Float(v) => ('f', format!("{:016x}", v.to_bits())),
            ParameterValue::Text(v) => ('s', format!("{}:{v}", v.len())),
        };
        let _ = write!(out, "{}:{name}={marker}:{text};", name.len());
    }
    out
}

/// A configuration proposed by an agent, optionally carrying its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CandidateRecord")]
pub struct Candidate {
    assignment: Assignment,
    score: Option<f64>,
    id: CandidateId,
}

#[derive(Deserialize)]
struct CandidateRecord {
    assignment: Assignment,
    #[serde(default)]
    score: Option<f64>,
}

impl From<CandidateRecord> for Candidate {
    fn from(record: CandidateRecord) -> Self {
        let mut candidate = Candidate::new(record.assignment);
        candidate.score = record.score;
        candidate
    }
}

impl Candidate {
    /// Create an unscored candidate.
    pub fn new(assignment: Assignment) -> Self {
        let id = CandidateId::of(&assignment);
        Self {
            assignment,
            score: None,
            id,
        }
    }

    pub fn with_score(assignment: Assignment, score: f64) -> Self {
        let mut candidate = Self::new(assignment);
        candidate.score = Some(score);
        candidate
    }

    pub fn id(&self) -> CandidateId {
        self.id
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// Set the score if none is recorded yet.
    ///
    /// Returns `false` when a different score is already present; the stored
    /// score is left untouched in that case.
    pub fn record_score(&mut self, score: f64) -> bool {
        match self.score {
            None => {
                self.score = Some(score);
                true
            }
            Some(existing) if existing.to_bits() == score.to_bits() => true,
            Some(existing) => {
                warn!(
                    "Refusing to rescore candidate {} ({} -> {})",
                    self.id, existing, score
                );
                false
            }
        }
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.assignment.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")?;
        match self.score {
            Some(score) => write!(f, " score={score:.4}"),
            None => write!(f, " unscored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(pairs: &[(&str, ParameterValue)]) -> Assignment {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn identity_ignores_insertion_order() {
        let mut a = Assignment::new();
        a.insert("a".into(), 1.into());
        a.insert("b".into(), "x".into());

        let mut b = Assignment::new();
        b.insert("b".into(), "x".into());
        b.insert("a".into(), 1.into());

        assert_eq!(CandidateId::of(&a), CandidateId::of(&b));
        assert_eq!(Candidate::new(a), Candidate::new(b));
    }

    #[test]
    fn identity_ignores_score() {
        let config = assignment(&[("param1", 10.into())]);
        let unscored = Candidate::new(config.clone());
        let scored = Candidate::with_score(config, 0.85);
        assert_eq!(unscored.id(), scored.id());
        assert_eq!(unscored, scored);
        assert_eq!(scored.score(), Some(0.85));
    }

    #[test]
    fn different_assignments_differ() {
        let a = Candidate::new(assignment(&[("a", 1.into()), ("b", 2.into())]));
        let b = Candidate::new(assignment(&[("a", 2.into()), ("b", 1.into())]));
        assert_ne!(a, b);
    }

    #[test]
    fn value_types_are_part_of_identity() {
        let int = assignment(&[("x", ParameterValue::Int(2))]);
        let float = assignment(&[("x", ParameterValue::Float(2.0))]);
        let text = assignment(&[("x", ParameterValue::Text("2".into()))]);
        assert_ne!(CandidateId::of(&int), CandidateId::of(&float));
        assert_ne!(CandidateId::of(&int), CandidateId::of(&text));
    }

    #[test]
    fn canonical_key_does_not_confuse_separators() {
        let a = assignment(&[("a", "x;b=s:1:y".into())]);
        let b = assignment(&[("a", "x".into()), ("b", "y".into())]);
        assert_ne!(canonical_key(&a), canonical_key(&b));
    }

    #[test]
    fn record_score_is_write_once() {
        let mut candidate = Candidate::new(assignment(&[("x", 1.into())]));
        assert!(!candidate.is_scored());
        assert!(candidate.record_score(0.4));
        assert!(candidate.record_score(0.4));
        assert!(!candidate.record_score(0.9));
        assert_eq!(candidate.score(), Some(0.4));
    }

    #[test]
    fn deserialization_recomputes_identity() {
        let original = Candidate::with_score(assignment(&[("lr", 0.01.into())]), 0.7);
        let json = serde_json::to_string(&original).unwrap();
        let back: Candidate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), original.id());
        assert_eq!(back.score(), Some(0.7));

        let bare: Candidate = serde_json::from_str(r#"{"assignment":{"lr":0.01}}"#).unwrap();
        assert_eq!(bare.id(), original.id());
        assert!(!bare.is_scored());
    }
}
