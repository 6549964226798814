//! Built-in demo problems: a search space, run defaults and a simulated
//! scoring function for each.

use mm_search::{Objective, SearchConfig};
use mm_types::{Assignment, EvaluationError, SearchSpace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    space: fn() -> SearchSpace,
    scorer: fn(&Assignment) -> f64,
    agent_kinds: Option<&'static [&'static str]>,
    num_agents: usize,
    num_iterations: usize,
    communication_interval: usize,
    noise: f64,
    clamp: bool,
}

impl Preset {
    pub fn space(&self) -> SearchSpace {
        (self.space)()
    }

    /// Run defaults for this preset.
    pub fn config(&self) -> SearchConfig {
        let mut config = SearchConfig::new(self.name, self.space())
            .with_agents(self.num_agents)
            .with_iterations(self.num_iterations)
            .with_communication_interval(self.communication_interval);
        if let Some(kinds) = self.agent_kinds {
            config = config.with_agent_kinds(kinds);
        }
        config
    }

    /// Scoring function with reproducible noise.
    pub fn objective(&self, seed: u64) -> NoisyObjective {
        NoisyObjective {
            scorer: self.scorer,
            noise: self.noise,
            clamp: self.clamp,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

/// A deterministic scorer plus uniform noise in `[-noise, noise]`.
pub struct NoisyObjective {
    scorer: fn(&Assignment) -> f64,
    noise: f64,
    clamp: bool,
    rng: ChaCha8Rng,
}

impl Objective for NoisyObjective {
    fn evaluate(&mut self, assignment: &Assignment) -> Result<f64, EvaluationError> {
        let mut score = (self.scorer)(assignment);
        if self.noise > 0.0 {
            score += self.rng.random_range(-self.noise..=self.noise);
        }
        Ok(if self.clamp { score.clamp(0.0, 1.0) } else { score })
    }
}

pub fn all() -> &'static [Preset] {
    &PRESETS
}

pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

fn num(a: &Assignment, key: &str) -> f64 {
    a.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0)
}

fn text<'a>(a: &'a Assignment, key: &str) -> &'a str {
    a.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

static PRESETS: [Preset; 6] = [
    Preset {
        name: "toy",
        description: "Two parameters, optimum at x=4, y=20",
        space: toy_space,
        scorer: toy_score,
        agent_kinds: None,
        num_agents: 4,
        num_iterations: 30,
        communication_interval: 10,
        noise: 0.0,
        clamp: false,
    },
    Preset {
        name: "neural-network",
        description: "Simulated neural network hyperparameters",
        space: nn_space,
        scorer: nn_score,
        agent_kinds: None,
        num_agents: 6,
        num_iterations: 30,
        communication_interval: 5,
        noise: 0.03,
        clamp: true,
    },
    Preset {
        name: "preprocessing",
        description: "Simulated data preprocessing pipeline",
        space: pipeline_space,
        scorer: pipeline_score,
        agent_kinds: Some(&["random", "greedy", "greedy", "greedy"]),
        num_agents: 4,
        num_iterations: 40,
        communication_interval: 8,
        noise: 0.04,
        clamp: true,
    },
    Preset {
        name: "projection-pursuit",
        description: "Projection pursuit index and tour parameters",
        space: projection_space,
        scorer: projection_score,
        agent_kinds: Some(&["random", "random", "greedy", "greedy", "greedy", "greedy"]),
        num_agents: 6,
        num_iterations: 80,
        communication_interval: 10,
        noise: 0.04,
        clamp: true,
    },
    Preset {
        name: "diagnostic-thresholds",
        description: "Diagnostic thresholds for projection pursuit",
        space: threshold_space,
        scorer: threshold_score,
        agent_kinds: None,
        num_agents: 4,
        num_iterations: 50,
        communication_interval: 10,
        noise: 0.03,
        clamp: true,
    },
    Preset {
        name: "comparison",
        description: "Known optimum a=4, b=30, c=y for strategy comparisons",
        space: comparison_space,
        scorer: comparison_score,
        agent_kinds: None,
        num_agents: 4,
        num_iterations: 20,
        communication_interval: 5,
        noise: 0.05,
        clamp: false,
    },
];

fn toy_space() -> SearchSpace {
    SearchSpace::new()
        .add_ints("x", &[1, 2, 3, 4, 5])
        .add_ints("y", &[10, 20, 30])
}

fn toy_score(a: &Assignment) -> f64 {
    let mut score = 0.0;
    if num(a, "x") == 4.0 {
        score += 0.5;
    }
    if num(a, "y") == 20.0 {
        score += 0.5;
    }
    score
}

fn nn_space() -> SearchSpace {
    SearchSpace::new()
        .add_ints("num_layers", &[2, 3, 4, 5])
        .add_ints("layer_size", &[64, 128, 256])
        .add_floats("dropout", &[0.0, 0.1, 0.2, 0.3])
        .add_floats("learning_rate", &[0.001, 0.01, 0.1])
        .add_texts("optimizer", &["adam", "sgd", "rmsprop"])
}

fn nn_score(a: &Assignment) -> f64 {
    let mut score = 0.6 + num(a, "num_layers") * 0.03;
    score += match num(a, "layer_size") as i64 {
        128 => 0.1,
        256 => 0.05,
        _ => 0.0,
    };
    if (0.1..=0.2).contains(&num(a, "dropout")) {
        score += 0.08;
    }
    if num(a, "learning_rate") == 0.01 {
        score += 0.1;
    }
    if text(a, "optimizer") == "adam" {
        score += 0.08;
    }
    score
}

fn pipeline_space() -> SearchSpace {
    SearchSpace::new()
        .add_texts("scaling", &["standard", "minmax", "robust", "none"])
        .add_texts(
            "feature_selection",
            &["variance", "correlation", "mutual_info", "none"],
        )
        .add_texts("dimensionality_reduction", &["pca", "ica", "lda", "none"])
        .add_ints("n_components", &[5, 10, 20, 30])
        .add_texts("handle_outliers", &["clip", "remove", "keep"])
}

fn pipeline_score(a: &Assignment) -> f64 {
    let mut score = 0.5;
    if matches!(text(a, "scaling"), "standard" | "robust") {
        score += 0.12;
    }
    if text(a, "feature_selection") != "none" {
        score += 0.1;
    }
    if matches!(text(a, "dimensionality_reduction"), "pca" | "ica") {
        score += 0.08;
        if matches!(num(a, "n_components") as i64, 10 | 20) {
            score += 0.05;
        }
    }
    if matches!(text(a, "handle_outliers"), "clip" | "remove") {
        score += 0.08;
    }
    score
}

fn projection_space() -> SearchSpace {
    SearchSpace::new()
        .add_texts(
            "index_function",
            &["holes", "central_mass", "lda", "pda", "stringy"],
        )
        .add_texts("tour_path", &["guided", "little", "grand"])
        .add_texts("cooling", &["linear", "exponential", "geometric"])
        .add_ints("max_tries", &[10, 25, 50, 100])
        .add_floats("alpha", &[0.1, 0.25, 0.5, 0.75, 1.0])
        .add_floats("lambda", &[0.0, 0.5, 1.0, 2.0])
}

fn projection_score(a: &Assignment) -> f64 {
    let mut score = 0.5;
    score += match text(a, "index_function") {
        "stringy" => 0.15,
        "holes" => 0.14,
        "central_mass" => 0.12,
        "lda" => 0.10,
        "pda" => 0.08,
        _ => 0.05,
    };
    score += match text(a, "tour_path") {
        "guided" => 0.12,
        "grand" => 0.08,
        _ => 0.0,
    };
    score += match text(a, "cooling") {
        "exponential" => 0.10,
        "geometric" => 0.08,
        "linear" => 0.05,
        _ => 0.0,
    };
    let tries = num(a, "max_tries");
    if tries >= 50.0 {
        score += 0.10;
    } else if tries >= 25.0 {
        score += 0.07;
    }
    if (0.25..=0.75).contains(&num(a, "alpha")) {
        score += 0.08;
    }
    if (0.5..=1.0).contains(&num(a, "lambda")) {
        score += 0.06;
    }
    score
}

fn threshold_space() -> SearchSpace {
    SearchSpace::new()
        .add_floats("convergence_threshold", &[1e-6, 1e-5, 1e-4, 1e-3])
        .add_floats("min_structure_score", &[0.1, 0.2, 0.3, 0.4, 0.5])
        .add_floats("outlier_percentile", &[0.90, 0.95, 0.99])
        .add_floats("min_projection_distance", &[0.01, 0.05, 0.1, 0.2])
        .add_ints("stability_window", &[5, 10, 20, 30])
}

fn threshold_score(a: &Assignment) -> f64 {
    let mut score = 0.5;
    let convergence = num(a, "convergence_threshold");
    if convergence == 1e-4 {
        score += 0.15;
    } else if convergence == 1e-5 {
        score += 0.12;
    }
    if num(a, "min_structure_score") >= 0.3 {
        score += 0.1;
    }
    if num(a, "outlier_percentile") == 0.95 {
        score += 0.1;
    }
    if (0.05..=0.1).contains(&num(a, "min_projection_distance")) {
        score += 0.12;
    }
    if (10.0..=20.0).contains(&num(a, "stability_window")) {
        score += 0.08;
    }
    score
}

fn comparison_space() -> SearchSpace {
    SearchSpace::new()
        .add_ints("param_a", &[1, 2, 3, 4, 5])
        .add_ints("param_b", &[10, 20, 30, 40, 50])
        .add_texts("param_c", &["x", "y", "z"])
}

fn comparison_score(a: &Assignment) -> f64 {
    let mut score = 0.0;
    if num(a, "param_a") == 4.0 {
        score += 0.4;
    }
    if num(a, "param_b") == 30.0 {
        score += 0.4;
    }
    if text(a, "param_c") == "y" {
        score += 0.2;
    }
    score
}
