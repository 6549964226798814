use mm_search::SearchCoordinator;
use mm_types::{Assignment, SearchSpace};

/// Simulated network quality: deeper and wider help with diminishing
/// returns, the learning rate should sit near 0.01, relu beats tanh.
fn network_score(config: &Assignment) -> f64 {
    let layers = config.get("num_layers").and_then(|v| v.as_f64()).unwrap_or(1.0);
    let width = config.get("layer_size").and_then(|v| v.as_f64()).unwrap_or(32.0);
    let lr = config.get("learning_rate").and_then(|v| v.as_f64()).unwrap_or(0.01);
    let activation = config.get("activation").and_then(|v| v.as_str()).unwrap_or("relu");

    let mut score = 0.5;
    score += (layers * 0.05).min(0.2);
    score += (width / 512.0).min(0.15);
    score -= ((lr - 0.01).abs() * 10.0).min(0.2);
    score += match activation {
        "relu" => 0.1,
        "tanh" => 0.05,
        _ => 0.0,
    };
    score.clamp(0.0, 1.0)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let space = SearchSpace::new()
        .add_ints("num_layers", &[1, 2, 3, 4, 5, 6])
        .add_ints("layer_size", &[32, 64, 128, 256, 512])
        .add_floats("learning_rate", &[0.001, 0.005, 0.01, 0.05, 0.1])
        .add_texts("activation", &["relu", "tanh", "sigmoid"]);
    let grid = space.grid_size().unwrap_or(0);

    println!("Search space size: {grid} configurations");

    let mut coordinator = SearchCoordinator::new(
        space.clone(),
        network_score,
        4,
        Some(&["random", "greedy", "random", "greedy"][..]),
    )?
    .with_seed(2024);

    let best = coordinator.search(50, 10, false)?;
    let stats = coordinator.statistics();

    match best {
        Some(best) => println!("Best architecture: {best}"),
        None => println!("No architecture was evaluated"),
    }
    println!("{stats}");
    if let Some(coverage) = stats.coverage(&space) {
        println!("Coverage: {:.1}%", coverage * 100.0);
    }

    Ok(())
}
