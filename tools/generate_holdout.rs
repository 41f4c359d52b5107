//! Held-out Dataset Generator
//!
//! Writes a synthetic, already-encoded held-out CSV for exercising the batch
//! and live feed features without the original test split.

use anyhow::{ensure, Context};
use fraud_dashboard::types::transaction::{TransactionType, FEATURE_NAMES, STEP_RANGE};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Transaction generator for the held-out set
struct TransactionGenerator {
    rng: StdRng,
}

impl TransactionGenerator {
    fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn step(&mut self) -> f64 {
        self.rng.gen_range(STEP_RANGE) as f64
    }

    /// Ordinary transfer where both accounts move by the amount
    fn generate_legitimate(&mut self) -> [f64; 7] {
        let ty = *TransactionType::ALL
            .choose(&mut self.rng)
            .unwrap_or(&TransactionType::Payment);
        let amount = round2(self.rng.gen_range(10.0..20_000.0));
        let old_balance_orig = round2(self.rng.gen_range(0.0..100_000.0));
        let old_balance_dest = round2(self.rng.gen_range(0.0..200_000.0));

        let (new_balance_orig, new_balance_dest) = match ty {
            TransactionType::CashIn => (old_balance_orig + amount, (old_balance_dest - amount).max(0.0)),
            // Merchants do not report destination balances
            TransactionType::Payment => ((old_balance_orig - amount).max(0.0), 0.0),
            _ => ((old_balance_orig - amount).max(0.0), old_balance_dest + amount),
        };
        let old_balance_dest = if ty == TransactionType::Payment { 0.0 } else { old_balance_dest };

        [
            self.step(),
            ty.code() as f64,
            amount,
            old_balance_orig,
            round2(new_balance_orig),
            old_balance_dest,
            round2(new_balance_dest),
        ]
    }

    /// Account takeover pattern: the origin is drained by a transfer or cash-out
    fn generate_suspicious(&mut self) -> [f64; 7] {
        let ty = if self.rng.gen_bool(0.5) {
            TransactionType::Transfer
        } else {
            TransactionType::CashOut
        };
        let amount = round2(self.rng.gen_range(5_000.0..1_000_000.0));
        let old_balance_dest = if self.rng.gen_bool(0.7) {
            0.0
        } else {
            round2(self.rng.gen_range(0.0..50_000.0))
        };

        [
            self.step(),
            ty.code() as f64,
            amount,
            amount,
            0.0,
            old_balance_dest,
            old_balance_dest,
        ]
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_holdout=info".parse()?),
        )
        .init();

    info!("Starting Held-out Dataset Generator");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let output = args.get(1).map(|s| s.as_str()).unwrap_or("data/X_test.csv");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1000);
    let fraud_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.05);
    let seed: Option<u64> = args.get(4).and_then(|s| s.parse().ok());

    ensure!((0.0..=1.0).contains(&fraud_rate), "fraud rate must be within 0..=1, got {}", fraud_rate);

    info!(
        output = %output,
        count = count,
        fraud_rate = fraud_rate,
        seed = ?seed,
        "Configuration loaded"
    );

    if let Some(parent) = std::path::Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let mut writer =
        csv::Writer::from_path(output).with_context(|| format!("Failed to create {}", output))?;
    writer.write_record(FEATURE_NAMES)?;

    let mut generator = TransactionGenerator::new(seed);
    let mut legitimate_count = 0;
    let mut suspicious_count = 0;

    for i in 0..count {
        let row = if generator.rng.gen_bool(fraud_rate) {
            suspicious_count += 1;
            generator.generate_suspicious()
        } else {
            legitimate_count += 1;
            generator.generate_legitimate()
        };

        writer.serialize(row)?;

        if (i + 1) % 1000 == 0 {
            info!("Wrote {}/{} rows", i + 1, count);
        }
    }
    writer.flush()?;

    info!(
        "Completed! Wrote {} rows ({} legitimate, {} suspicious) to {}",
        count, legitimate_count, suspicious_count, output
    );

    Ok(())
}
