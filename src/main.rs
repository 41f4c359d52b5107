//! Fraud Detection Dashboard - Main Entry Point
//!
//! Loads the classifier and held-out dataset, then reads dashboard commands
//! from stdin while driving the live feed simulation on a timer.

use anyhow::{Context, Result};
use fraud_dashboard::{
    batch::BatchSampler,
    command::{self, Command},
    config::{AppConfig, LoggingConfig, TwilioCredentials, DEFAULT_PATH},
    holdout::{HoldoutSet, RowSampler},
    live_feed::LiveFeed,
    models::OnnxClassifier,
    notifier::TwilioNotifier,
    predictor::Predictor,
    render,
    session::{Dashboard, Output},
};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};


#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from_path(&path)?,
        None if Path::new(DEFAULT_PATH).exists() => AppConfig::load()?,
        None => AppConfig::default(),
    };

    init_logging(&config.logging)?;

    info!("Starting Fraud Detection Dashboard");
    info!(
        "Alert threshold: {:.2}, batch size: {}, live budget: {} x {}s",
        config.detection.alert_threshold,
        config.detection.batch_size,
        config.simulation.max_iterations,
        config.simulation.interval_secs
    );

    // Model loading failure is fatal
    let classifier = OnnxClassifier::load(&config.model).context("Failed to load fraud model")?;
    info!(model = %classifier.model_name(), "Fraud model loaded");

    let holdout = match HoldoutSet::load(&config.holdout.path) {
        Ok(holdout) => {
            info!(
                path = %holdout.path().display(),
                rows = holdout.len(),
                "Batch and live features enabled"
            );
            Some(holdout)
        }
        Err(e) => {
            warn!(error = %e, "Held-out dataset unavailable, batch and live features disabled");
            None
        }
    };

    let credentials = TwilioCredentials::from_env();
    let missing = credentials.missing();
    if !missing.is_empty() {
        warn!(missing = ?missing, "Twilio credentials incomplete, alerts will fail");
    }
    let notifier = TwilioNotifier::new(&config.notifier, credentials)?;

    let mut dashboard = Dashboard::new(
        Predictor::new(classifier, notifier, config.detection.alert_threshold),
        BatchSampler::new(config.detection.batch_size),
        holdout,
        RowSampler::new(config.holdout.seed),
        LiveFeed::new(config.simulation.max_iterations),
    );

    println!("{}", render::banner());
    for notice in dashboard.startup_notices() {
        show(&notice);
    }
    println!("Type 'help' for commands.");

    let interval = config.simulation.interval();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut next_tick = Instant::now();

    loop {
        if !stdin_open && !dashboard.is_live() {
            break;
        }

        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    stdin_open = false;
                    continue;
                };

                let command = match command::parse_line(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        show(&Output::Error(e.to_string()));
                        continue;
                    }
                };

                let was_live = dashboard.is_live();
                let starting = matches!(command, Command::Start);
                let output = dashboard.handle(command).await;
                if output == Output::Quit {
                    break;
                }
                show(&output);

                // A fresh run scores its first transaction right away
                if starting && !was_live && dashboard.is_live() {
                    next_tick = Instant::now();
                }
            }
            _ = sleep_until(next_tick), if dashboard.is_live() => {
                if let Some(output) = dashboard.tick().await {
                    show(&output);
                }
                next_tick = Instant::now() + interval;
            }
        }
    }

    info!("Dashboard shutting down...");
    dashboard.stats().print_summary();

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(format!("fraud_dashboard={}", config.level))
            .context("Invalid log level")?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn show(output: &Output) {
    match output {
        Output::Render(text) => println!("{}", text),
        Output::Info(text) => println!("ℹ️  {}", text),
        Output::Error(text) => println!("❌ {}", text),
        Output::Quit => {}
    }
}
