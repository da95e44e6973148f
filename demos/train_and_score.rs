//! Train-and-Score Demo
//!
//! Run with: `cargo run --example train_and_score`
//!
//! Writes a synthetic feature CSV, trains the per-feature ensemble into a
//! scratch model directory, then scores the same table and prints the signal.

use std::fmt::Write as _;

use ensemble_signal::config::PipelineConfig;
use ensemble_signal::model::Family;
use ensemble_signal::pipeline::{metadata_path, run_scoring, run_training};

fn synthetic_features() -> String {
    let mut csv = String::from("timestamp,label,momentum,mean_reversion,noise\n");
    for i in 0..60u32 {
        let phase = f64::from(i) / 6.0;
        let momentum = phase.sin();
        let label = if momentum > 0.3 {
            1
        } else if momentum < -0.3 {
            -1
        } else {
            0
        };
        let mean_reversion = -momentum * 0.8 + f64::from(i % 4) * 0.05;
        let noise = f64::from((i * 37) % 13) - 6.0;
        let _ = writeln!(
            csv,
            "2024-03-{:02} {:02}:00:00,{label},{momentum:.4},{mean_reversion:.4},{noise}",
            1 + i / 24,
            i % 24
        );
    }
    csv
}

fn main() -> ensemble_signal::Result<()> {
    println!("=== Per-Feature Ensemble Demo ===\n");

    let workspace = std::env::temp_dir().join("ensemble_signal_demo");
    std::fs::create_dir_all(&workspace)?;
    let features = workspace.join("features.csv");
    std::fs::write(&features, synthetic_features())?;

    // Fewer trees than the default keeps the demo quick.
    let config = PipelineConfig::default().with_trees(50);

    println!("1. Training");
    println!("   --------");
    let models = workspace.join("models");
    let summary = run_training(&features, &models, &config)?;
    for feature in summary.feature_names() {
        for family in Family::ALL {
            if let Some(metrics) = summary.get(feature, family) {
                println!(
                    "   {feature:>15} {family:>6}  accuracy={:.3} f1={:.3}",
                    metrics.accuracy(),
                    metrics.f1()
                );
            }
        }
    }
    println!("   {} artifacts in {}\n", summary.len(), models.display());

    println!("2. Scoring");
    println!("   -------");
    let out = workspace.join("signal.csv");
    let (series, metadata) = run_scoring(&features, &models, &out, &config)?;
    for (timestamp, signal) in series.iter().take(12) {
        println!("   {timestamp}  {signal:>2}");
    }
    println!("   ... {} rows total", series.len());
    println!("   features used: {:?}", metadata.features_used());
    println!("   signal:   {}", out.display());
    println!("   metadata: {}\n", metadata_path(&out).display());

    println!("Demo completed successfully!");
    Ok(())
}
