//! Replays recorded detector output through the pose stabilization pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use pose_stabilization::config::{Config, EXAMPLE_CONFIG};
use pose_stabilization::replay::Recording;
use pose_stabilization::segmentation::GarmentCategory;
use pose_stabilization::session::{FrameOutcome, TrackingSession};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recording to replay (YAML)
    #[arg(required_unless_present = "example_config")]
    recording: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Print overlay constraints for this garment category (tops, outerwear, bottoms, dresses)
    #[arg(short = 'g', long)]
    category: Option<GarmentCategory>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    example_config: bool,
}

fn describe(outcome: &FrameOutcome) -> String {
    let source = outcome.source.map_or_else(|| "none".to_string(), |s| s.to_string());
    let corrections: Vec<String> = outcome.corrections.iter().map(ToString::to_string).collect();
    format!(
        "{:<8} {:<9} confidence {:.2}{}{}",
        outcome.tracking_state,
        source,
        outcome.confidence,
        if outcome.renderable { "" } else { " (hidden)" },
        if corrections.is_empty() {
            String::new()
        } else {
            format!(" [{}]", corrections.join("; "))
        }
    )
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.example_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => Config::default(),
    };
    let mut session = TrackingSession::new(config)?;

    let path = args.recording.context("no recording given")?;
    let recording = Recording::from_file(&path).with_context(|| format!("reading {}", path.display()))?;
    info!(
        "Replaying {} frames at {}x{}",
        recording.frames.len(),
        recording.width,
        recording.height
    );

    let outcomes = recording.replay(&mut session);
    for (frame, outcome) in recording.frames.iter().zip(&outcomes) {
        println!("{:>8} ms  {}", frame.timestamp_ms, describe(outcome));
    }

    let rendered = outcomes.iter().filter(|o| o.renderable).count();
    info!("{} of {} frames renderable", rendered, outcomes.len());

    if let Some(category) = args.category {
        match session.overlay_constraints(recording.width, recording.height, category)? {
            Some(constraints) => {
                println!("Overlay constraints for {category}:");
                for zone in &constraints.safe_zones {
                    println!("  safe   {zone:?}");
                }
                for zone in &constraints.avoid_zones {
                    println!("  avoid  {zone:?}");
                }
                for anchor in &constraints.anchor_points {
                    println!(
                        "  anchor {} ({:.1}, {:.1}) weight {:.1}",
                        anchor.name, anchor.position.x, anchor.position.y, anchor.weight
                    );
                }
            }
            None => println!("No stabilized pose for overlay constraints"),
        }
    }

    Ok(())
}
