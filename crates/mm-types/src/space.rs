//! Search space definitions: named parameters with discrete candidate values.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::errors::{ConfigError, MmResult};

/// One concrete choice of a value for every parameter, keyed by name.
///
/// A `BTreeMap` keeps keys sorted, so two assignments built in different
/// insertion orders are indistinguishable.
pub type Assignment = BTreeMap<String, ParameterValue>;

/// A single allowed value for a parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParameterValue {
    fn tag(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) => 1,
            Self::Float(_) => 2,
            Self::Text(_) => 3,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

// Floats compare by bit pattern so that `Eq` and `Hash` agree.
impl PartialEq for ParameterValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ParameterValue {}

impl Hash for ParameterValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
        match self {
            Self::Bool(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Text(v) => v.hash(state),
        }
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParameterValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A single parameter dimension in the search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    /// Human-readable parameter name (e.g. "learning_rate").
    pub name: String,
    /// Allowed values, in declaration order.
    pub values: Vec<ParameterValue>,
}

impl ParameterDef {
    pub fn allows(&self, value: &ParameterValue) -> bool {
        self.values.contains(value)
    }
}

/// The full search space: an ordered list of parameter definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    pub parameters: Vec<ParameterDef>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_choice(mut self, name: impl Into<String>, values: Vec<ParameterValue>) -> Self {
        self.parameters.push(ParameterDef {
            name: name.into(),
            values,
        });
        self
    }

    pub fn add_ints(self, name: impl Into<String>, values: &[i64]) -> Self {
        self.add_choice(name, values.iter().copied().map(ParameterValue::Int).collect())
    }

    pub fn add_floats(self, name: impl Into<String>, values: &[f64]) -> Self {
        self.add_choice(name, values.iter().copied().map(ParameterValue::Float).collect())
    }

    pub fn add_texts(self, name: impl Into<String>, values: &[&str]) -> Self {
        self.add_choice(name, values.iter().map(|v| ParameterValue::from(*v)).collect())
    }

    pub fn add_bools(self, name: impl Into<String>) -> Self {
        self.add_choice(
            name,
            vec![ParameterValue::Bool(false), ParameterValue::Bool(true)],
        )
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDef> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    /// Total number of distinct assignments, or `None` on overflow.
    pub fn grid_size(&self) -> Option<usize> {
        self.parameters
            .iter()
            .try_fold(1usize, |total, p| total.checked_mul(p.values.len()))
    }

    pub fn allows(&self, name: &str, value: &ParameterValue) -> bool {
        self.get(name).is_some_and(|p| p.allows(value))
    }

    /// True when `assignment` covers every parameter exactly once with an
    /// allowed value and carries no extra keys.
    pub fn contains(&self, assignment: &Assignment) -> bool {
        assignment.len() == self.parameters.len()
            && self.parameters.iter().all(|p| {
                assignment
                    .get(&p.name)
                    .is_some_and(|value| p.allows(value))
            })
    }

    /// Reject spaces that cannot produce a total assignment.
    pub fn validate(&self) -> MmResult<()> {
        if self.parameters.is_empty() {
            return Err(ConfigError::EmptySearchSpace.into());
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            if param.values.is_empty() {
                return Err(ConfigError::EmptyParameter {
                    name: param.name.clone(),
                }
                .into());
            }
            if !seen.insert(param.name.as_str()) {
                return Err(ConfigError::DuplicateParameter {
                    name: param.name.clone(),
                }
                .into());
            }
        }

        Ok(())
    }
}
