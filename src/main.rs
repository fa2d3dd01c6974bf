// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use botcheck_agent::models::config::AuditConfig;
use botcheck_agent::services::engine::{run_audit, run_batch_audit};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

// Version is extracted from Cargo.toml at compile time via build.rs
// In CI/CD, the patch version can be overridden via BOTCHECK_PATCH_VERSION env var
const VERSION: &str = env!("BOTCHECK_VERSION");

/// Audit how well a single page is exposed to crawlers and AI agents
#[derive(Parser, Debug)]
#[command(name = "botcheck-agent", version = VERSION)]
struct Args {
    /// Target URL to audit; a missing scheme defaults to https
    #[arg(required_unless_present = "batch")]
    url: Option<String>,

    /// Probe a specific bot by name (repeatable)
    #[arg(long = "bot")]
    bots: Vec<String>,

    /// Expand a bot group: search, ai, crawlers (repeatable)
    #[arg(long = "group")]
    groups: Vec<String>,

    /// Retry profile: strict, standard, aggressive
    #[arg(long, default_value = "standard")]
    retry_profile: String,

    /// Criticality weight profile: balanced, search_first, ai_first
    #[arg(long, default_value = "balanced")]
    criticality_profile: String,

    /// SLA target profile: standard, strict
    #[arg(long, default_value = "standard")]
    sla_profile: String,

    /// Treat blocked AI bots as the intended policy outcome
    #[arg(long)]
    ai_block_expected: bool,

    /// Do not overwrite the stored baseline at run end
    #[arg(long)]
    no_baseline: bool,

    /// Probe worker pool size
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Directory owning bot_baselines/ and bot_trends/
    #[arg(long, default_value = "reports")]
    reports_root: PathBuf,

    /// Audit several URLs sequentially and merge the documents (repeatable)
    #[arg(long = "batch")]
    batch: Vec<String>,

    /// Write the JSON document here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    eprintln!("botcheck-agent v{}", VERSION);

    let batch_mode = !args.batch.is_empty();
    let config = AuditConfig {
        target_url: args.url.unwrap_or_default(),
        selected_bots: args.bots,
        bot_groups: args.groups,
        retry_profile: args.retry_profile,
        criticality_profile: args.criticality_profile,
        sla_profile: args.sla_profile,
        ai_block_expected: args.ai_block_expected,
        baseline_enabled: !args.no_baseline,
        batch_urls: if batch_mode { Some(args.batch) } else { None },
        concurrency: args.concurrency,
        reports_root: args.reports_root,
    };

    let json = if batch_mode {
        let document = run_batch_audit(&config).await;
        serde_json::to_string_pretty(&document).expect("result document serializes")
    } else {
        let document = run_audit(&config).await;
        serde_json::to_string_pretty(&document).expect("result document serializes")
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &json).expect("write result document");
            eprintln!("Result document written to {}", path.display());
        }
        None => println!("{}", json),
    }
}
