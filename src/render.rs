//! Terminal rendering of dashboard output

use crate::batch::BatchReport;
use crate::live_feed::{FeedState, LiveFeed, StopReason};
use crate::predictor::Evaluation;
use crate::types::alert::AlertOutcome;
use crate::types::transaction::{FeatureVector, TransactionInput, FEATURE_NAMES};
use comfy_table::{Cell, CellAlignment, Table};
use std::fmt::Write;

pub fn percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Title, example input and prediction legend.
pub fn banner() -> String {
    let example = TransactionInput::example();
    let mut out = String::new();
    let _ = writeln!(out, "🏦 Real-Time Fraud Detection System");
    let _ = writeln!(
        out,
        "Predicts whether a transaction is fraudulent using a trained model and sends WhatsApp alerts."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "📌 Example Transaction Input");
    let example_table = table(
        &FEATURE_NAMES,
        vec![vec![
            example.step.to_string(),
            example.transaction_type.clone(),
            format!("{:.2}", example.amount),
            format!("{:.2}", example.old_balance_orig),
            format!("{:.2}", example.new_balance_orig),
            format!("{:.2}", example.old_balance_dest),
            format!("{:.2}", example.new_balance_dest),
        ]],
    );
    let _ = writeln!(out, "{}", example_table);
    let _ = writeln!(out, "Prediction Legend: 0 = Legitimate ✅ | 1 = Fraudulent 🚨");
    out
}

/// Verdict line for a single prediction.
fn verdict(evaluation: &Evaluation, fraud_headline: &str) -> String {
    let result = &evaluation.result;
    if result.label.is_fraud() {
        format!("🚨 {} (Probability: {})", fraud_headline, percent(result.probability))
    } else {
        format!(
            "✅ Legitimate Transaction (Fraud Probability: {})",
            percent(result.probability)
        )
    }
}

fn alert_line(alert: &AlertOutcome) -> Option<String> {
    match alert {
        AlertOutcome::NotTriggered => None,
        AlertOutcome::Sent { message_id } => {
            Some(format!("📲 WhatsApp alert sent successfully! ({})", message_id))
        }
        AlertOutcome::Failed { reason } => {
            Some(format!("⚠️ WhatsApp alert could not be sent: {}", reason))
        }
    }
}

/// Result of a manual prediction.
pub fn prediction(evaluation: &Evaluation) -> String {
    let mut out = String::from("🔍 Prediction Result\n");
    let _ = writeln!(out, "{}", verdict(evaluation, "Fraudulent Transaction Detected!"));
    if let Some(line) = alert_line(&evaluation.alert) {
        let _ = writeln!(out, "{}", line);
    }
    out
}

/// Batch table plus fraud count.
pub fn batch_report(report: &BatchReport) -> String {
    let mut headers: Vec<&str> = FEATURE_NAMES.to_vec();
    headers.push("Fraud_Prediction");
    headers.push("Fraud_Probability");

    let rows = report.rows.iter().map(|row| {
        let mut cells = feature_cells(&row.features);
        cells.push(row.label.as_raw().to_string());
        cells.push(format!("{:.6}", row.probability));
        cells
    });

    let mut out = String::from("🎲 Predictions for Random Transactions\n");
    let _ = writeln!(out, "{}", table(&headers, rows));
    let _ = writeln!(out, "🚨 Fraudulent Transactions Detected: {}", report.fraud_count);
    out
}

/// One live feed iteration.
pub fn live_frame(iteration: u32, max_iterations: u32, features: &FeatureVector, evaluation: &Evaluation) -> String {
    let mut out = format!(
        "🔴 Incoming Transaction {}/{} ({})\n",
        iteration,
        max_iterations,
        chrono::Local::now().format("%H:%M:%S")
    );
    let _ = writeln!(out, "{}", table(&FEATURE_NAMES, vec![feature_cells(features)]));
    let _ = writeln!(out, "{}", verdict(evaluation, "FRAUD ALERT!"));
    if let Some(line) = alert_line(&evaluation.alert) {
        let _ = writeln!(out, "{}", line);
    }
    out
}

pub fn feed_status(feed: &LiveFeed) -> String {
    match feed.state() {
        FeedState::Idle => "Live feed idle. Type 'start' to begin streaming transactions.".to_string(),
        FeedState::Running => format!(
            "Live feed running ({}/{} transactions).",
            feed.completed_iterations(),
            feed.max_iterations()
        ),
        FeedState::Stopped(StopReason::Manual) => format!(
            "Live feed stopped manually after {} transactions.",
            feed.completed_iterations()
        ),
        FeedState::Stopped(StopReason::BudgetExhausted) => format!(
            "Live feed finished after {} transactions.",
            feed.completed_iterations()
        ),
    }
}

fn feature_cells(features: &FeatureVector) -> Vec<String> {
    features.values().iter().map(|v| format_number(*v)).collect()
}

/// Integers without decimals, everything else with up to 6.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{:.6}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Feature table with numbers right-aligned.
fn table<I>(headers: &[&str], rows: I) -> Table
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut table = Table::new();
    table.set_header(headers.to_vec());
    for row in rows {
        table.add_row(
            row.into_iter()
                .map(|value| Cell::new(value).set_alignment(CellAlignment::Right))
                .collect::<Vec<_>>(),
        );
    }
    table
}
