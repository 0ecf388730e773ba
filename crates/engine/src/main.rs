//! Branchwright - generate, review, refine and compare branches for one
//! story anchor.
//!
//! Usage: `branchwright <context.json> [count]`

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use branchwright_domain::{
    BranchSettings, BranchVariation, ContextPackage, MultiBranchComparison, RefinementResult,
};
use branchwright_engine::use_cases::{BranchReview, RefinementSession};
use branchwright_engine::App;

/// Everything one run produced, printed as JSON.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    branches: Vec<BranchVariation>,
    reviews: Vec<BranchReview>,
    refinement: Option<RefinementResult>,
    comparison: Option<MultiBranchComparison>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "branchwright=info,branchwright_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let context_path = args
        .next()
        .context("usage: branchwright <context.json> [count]")?;
    let settings = BranchSettings::from_env();
    let count = match args.next() {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("invalid variation count: {raw}"))?,
        None => settings.default_variation_count,
    };

    let raw = std::fs::read_to_string(&context_path)
        .with_context(|| format!("failed to read {context_path}"))?;
    let context: ContextPackage =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {context_path}"))?;

    let app = App::new(settings);
    let use_cases = &app.use_cases;

    // Generate and store
    let generated = use_cases.generation.generate(&context, count)?;
    for variation in &generated {
        use_cases.branches.create(variation.clone()).await?;
    }
    tracing::info!(anchor_id = %context.anchor.id, count = generated.len(), "Generated branches");

    // Review, then resolve whatever can be fixed without a human
    let deviation = app.deviation_config();
    let mut reviews = use_cases.review.review_all(&generated, &context, &deviation);
    let mut branches = Vec::with_capacity(reviews.len());
    for review in &mut reviews {
        use_cases.branches.record_review(review).await?;
        let (record, applied) = use_cases
            .branches
            .apply_automatic_fixes(review.branch_id, &mut review.fixes)
            .await?;
        if !applied.is_empty() {
            review.refresh_blocking_issues();
        }
        branches.push(record.variation().clone());
    }

    // Rank, then refine the front runner
    let comparison = if branches.len() >= 2 {
        Some(use_cases.comparison.compare(&branches)?)
    } else {
        None
    };
    let top = comparison
        .as_ref()
        .and_then(|c| c.rankings.first().map(|r| r.branch_id))
        .or_else(|| branches.first().map(|b| b.id));

    let refinement = match top.and_then(|id| branches.iter().find(|b| b.id == id)) {
        Some(variation) => {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            let interrupt = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, stopping refinement after the current iteration");
                    on_interrupt.cancel();
                }
            });

            let mut session = RefinementSession::new(variation.clone());
            let result = use_cases
                .refinement
                .refine(&mut session, &context, &cancel)
                .await;
            interrupt.abort();
            let result = result?;

            let stored = use_cases
                .branches
                .update_variation(result.variation.clone())
                .await?;
            if let Some(slot) = branches.iter_mut().find(|b| b.id == stored.id()) {
                *slot = stored.variation().clone();
            }

            // Earlier findings describe the pre-refinement text
            let review = use_cases
                .review
                .review(stored.variation(), &context, &deviation);
            use_cases.branches.record_review(&review).await?;
            if let Some(slot) = reviews.iter_mut().find(|r| r.branch_id == review.branch_id) {
                *slot = review;
            }
            Some(result)
        }
        None => None,
    };

    // Compare the final set
    let comparison = if branches.len() >= 2 {
        Some(use_cases.comparison.compare(&branches)?)
    } else {
        comparison
    };

    let report = Report {
        branches,
        reviews,
        refinement,
        comparison,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
