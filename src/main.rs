// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};

use the_lightbox::config::{load_and_validate_config, RuntimeBuilder};
use the_lightbox::engine::{MatchContext, MatchSession, PassScheduler, StudyRecord};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <config.yaml> <studies.json>", args[0]);
        eprintln!("       studies.json holds an array of studies; the first is the active study");
        eprintln!("Example: {} configs/memory.yaml demos/ct-chest-with-prior.json", args[0]);
        std::process::exit(1);
    }

    let start_time = Instant::now();

    let config = load_and_validate_config(&args[1])
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("loading {}", args[1]))?;
    let (_store, engine) = RuntimeBuilder::from_config(&config)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let studies_json = fs::read_to_string(&args[2]).with_context(|| format!("reading {}", args[2]))?;
    let mut studies: Vec<StudyRecord> =
        serde_json::from_str(&studies_json).with_context(|| format!("parsing {}", args[2]))?;
    if studies.is_empty() {
        bail!("{} holds no studies", args[2]);
    }
    let active = studies.remove(0);

    println!("🖥️  Lightbox Matching Demo");
    println!("══════════════════════════");
    println!("Config: {}", args[1]);
    println!("Store backend: {:?}", config.store);
    println!("Active study: {} ({} priors)", active.id, studies.len());
    println!();

    let context = MatchContext::new(active, studies);
    let engine = Arc::new(engine);

    let result = if config.engine_options.coalesce_triggers.unwrap_or(true) {
        let scheduler = PassScheduler::new(Arc::clone(&engine));
        match scheduler.trigger(&context).await? {
            Some(result) => result,
            None => bail!("matching pass was superseded"),
        }
    } else {
        engine.run(&context).await?
    };

    println!("📋 Protocol: {} (score {})", result.protocol_id, result.score);
    println!("🎬 Stage: {} (index {})", result.stage_id, result.stage_index);
    println!(
        "🖼️  Viewports: {}/{} filled",
        result.filled_viewports(),
        result.viewport_assignments.len()
    );
    for assignment in &result.viewport_assignments {
        match &assignment.display_set {
            Some(display_set) => {
                let image = display_set
                    .image_id
                    .as_deref()
                    .map(|id| format!(", image {}", id))
                    .unwrap_or_default();
                println!(
                    "  {}. study {}, series {}{} (score {})",
                    assignment.viewport_index + 1,
                    display_set.study_id,
                    display_set.series_id,
                    image,
                    assignment.details.score
                );
            }
            None => println!("  {}. [empty]", assignment.viewport_index + 1),
        }
    }

    if !result.issues.is_empty() {
        println!("\n⚠️  Issues:");
        for issue in &result.issues {
            println!("  • {}", issue);
        }
    }

    let session = MatchSession::start(Arc::clone(&engine), context).await?;
    println!(
        "\n🧭 Stages: {} total, next available: {}",
        session.protocol().stages.len(),
        session.is_next_stage_available()
    );

    println!("\n⏱️  Total time: {:?}", start_time.elapsed());
    Ok(())
}
