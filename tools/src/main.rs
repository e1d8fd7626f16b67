//! report-runner: headless driver for the influencer ROI engine.
//!
//! Usage:
//!   report-runner summary  --data-dir ./data [--campaign C] [--category C]
//!                          [--min-followers N] [--max-followers N] [--json]
//!   report-runner export   --data-dir ./data --db report.db
//!   report-runner generate --data-dir ./data --seed 42 --influencers 50
//!   report-runner ipc      --data-dir ./data
//!
//! Every mode accepts --config FILE (JSON, see ReportConfig), and
//! --top-n N / --payout-attribution per_post|per_influencer on top of it.

use anyhow::{Context, Result};
use influence_core::{
    config::{PayoutAttribution, ReportConfig},
    dataset_generator::{self, GeneratorConfig},
    engine::ReportEngine,
    filter::{apply_filters, FilterSpec, FilteredView},
    loader::DirSource,
    report::{self, PostSortKey},
    snapshot::ReportSnapshot,
    store::ReportStore,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetDomains,
    ApplyFilters {
        #[serde(default)]
        campaigns: Option<Vec<String>>,
        #[serde(default)]
        categories: Option<Vec<String>>,
        #[serde(default)]
        min_followers: Option<u64>,
        #[serde(default)]
        max_followers: Option<u64>,
        #[serde(default)]
        sort_posts_by: Option<String>,
    },
    Reload,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    fingerprint: &'a str,
    overview: report::Overview,
    top_campaigns: Vec<influence_core::aggregate::CampaignSummary>,
    campaigns_by_iroas: Vec<influence_core::aggregate::CampaignSummary>,
    top_influencers: Vec<influence_core::aggregate::InfluencerSummary>,
    top_posts: Vec<influence_core::join::MergedRow>,
    payouts: Vec<report::PayoutLine>,
    underperformers: Vec<influence_core::aggregate::InfluencerSummary>,
    view: &'a FilteredView,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mode = args
        .get(1)
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .unwrap_or("summary");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let mut config = match flag_value(&args, "--config") {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    apply_overrides(&args, &mut config)?;

    match mode {
        "generate" => run_generate(&args, data_dir, &config),
        "summary" => {
            let mut engine = ReportEngine::new(config);
            let source = DirSource::new(data_dir, engine.config.sources.clone());
            let snapshot = engine.snapshot(&source)?;
            let spec = filter_from_args(&args, &snapshot);
            let view = apply_filters(&snapshot, &spec);
            if args.iter().any(|a| a == "--json") {
                let state = build_ui_state(&engine.config, &snapshot, &view, PostSortKey::default());
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                print_summary(&engine.config, &snapshot, &view, data_dir);
            }
            Ok(())
        }
        "export" => {
            let db = flag_value(&args, "--db").unwrap_or("report.db");
            let mut engine = ReportEngine::new(config);
            let source = DirSource::new(data_dir, engine.config.sources.clone());
            let snapshot = engine.snapshot(&source)?;

            let store = ReportStore::open(db)?;
            store.migrate()?;
            if store.has_fingerprint(snapshot.fingerprint.as_str())? {
                log::info!("inputs unchanged since a previous export; writing a new one anyway");
            }
            let export_id = store.export_snapshot(&snapshot, env!("CARGO_PKG_VERSION"))?;
            println!("exported {export_id} to {db}");
            Ok(())
        }
        "ipc" => {
            let mut engine = ReportEngine::new(config);
            let source = DirSource::new(data_dir, engine.config.sources.clone());
            run_ipc_loop(&mut engine, &source)
        }
        other => anyhow::bail!("unknown mode '{other}' (expected summary, export, generate or ipc)"),
    }
}

fn run_generate(args: &[String], data_dir: &str, config: &ReportConfig) -> Result<()> {
    let defaults = GeneratorConfig::default();
    let gen = GeneratorConfig {
        seed: parse_arg(args, "--seed", defaults.seed),
        influencers: parse_arg(args, "--influencers", defaults.influencers),
        ..defaults
    };
    let tables = dataset_generator::generate(&gen);
    dataset_generator::write_dataset(&tables, Path::new(data_dir), &config.sources)
        .with_context(|| format!("writing dataset to {data_dir}"))?;
    println!(
        "generated {} influencers, {} posts, {} tracking rows, {} payouts in {data_dir}",
        tables.influencers.len(),
        tables.posts.len(),
        tables.tracking.len(),
        tables.payouts.len(),
    );
    Ok(())
}

fn run_ipc_loop(engine: &mut ReportEngine, source: &DirSource) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        // Load errors are reported to the shell, not fatal to the loop.
        let reply = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Reload => {
                engine.invalidate();
                engine
                    .snapshot(source)
                    .map(|s| serde_json::json!({ "reloaded": s.fingerprint.as_str() }))
            }
            IpcCommand::GetDomains => engine
                .snapshot(source)
                .map(|s| serde_json::json!({ "domains": s.domains, "baseline_roas": s.baseline_roas })),
            IpcCommand::ApplyFilters {
                campaigns,
                categories,
                min_followers,
                max_followers,
                sort_posts_by,
            } => engine.snapshot(source).and_then(|snapshot| {
                let mut spec = FilterSpec::all(&snapshot);
                if let Some(c) = campaigns {
                    spec = spec.with_campaigns(c);
                }
                if let Some(c) = categories {
                    spec = spec.with_categories(c);
                }
                let min = min_followers.unwrap_or(spec.followers.min);
                let max = max_followers.unwrap_or(spec.followers.max);
                spec = spec.with_followers(min, max);

                let key = sort_posts_by
                    .as_deref()
                    .and_then(PostSortKey::parse)
                    .unwrap_or_default();
                let view = apply_filters(&snapshot, &spec);
                let state = build_ui_state(&engine.config, &snapshot, &view, key);
                Ok(serde_json::to_value(&state)?)
            }),
        };

        let out = match reply {
            Ok(value) => value,
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        writeln!(stdout, "{}", out)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state<'a>(
    config: &ReportConfig,
    snapshot: &'a ReportSnapshot,
    view: &'a FilteredView,
    sort_posts_by: PostSortKey,
) -> UiState<'a> {
    UiState {
        fingerprint: snapshot.fingerprint.as_str(),
        overview: report::overview(view),
        top_campaigns: report::top_campaigns_by_roas(view, config.top_n),
        campaigns_by_iroas: report::campaigns_by_iroas(view),
        top_influencers: report::top_influencers_by_revenue(view, config.top_n),
        top_posts: report::top_posts(view, sort_posts_by, config.top_n),
        payouts: report::payout_details(view),
        underperformers: report::underperformers(view, config.underperformer_roas_threshold),
        view,
    }
}

fn print_summary(config: &ReportConfig, snapshot: &ReportSnapshot, view: &FilteredView, data_dir: &str) {
    let o = report::overview(view);

    println!("=== INFLUENCER ROI REPORT ===");
    println!("  data_dir:       {data_dir}");
    println!("  fingerprint:    {}", &snapshot.fingerprint.as_str()[..12]);
    println!("  posts:          {} ({} shown)", snapshot.merged.len(), view.posts.len());
    println!("  influencers:    {} ({} shown)", snapshot.influencers.len(), view.influencers.len());
    println!("  campaigns:      {} ({} shown)", snapshot.campaigns.len(), view.campaigns.len());
    println!("  total revenue:  {:.0}", o.total_revenue);
    println!("  total payout:   {:.0}", o.total_payout);
    println!("  ROAS:           {:.2}x", o.roas);
    println!("  ROI:            {:.2}%", o.roi * 100.0);
    println!("  baseline ROAS:  {:.2}x", o.baseline_roas);

    let u = &snapshot.unattributed;
    if u.posts_without_campaign > 0 || u.posts_without_influencer > 0 {
        println!(
            "  unattributed:   {} posts without campaign, {} without influencer",
            u.posts_without_campaign, u.posts_without_influencer
        );
    }

    if view.is_empty() {
        println!();
        println!("  (No data for the selected filters)");
        return;
    }

    println!();
    println!("=== CAMPAIGNS BY iROAS ===");
    for c in report::campaigns_by_iroas(view) {
        println!(
            "  {:<20} | Revenue: {:>12.0} | Payout: {:>10.0} | ROAS: {:>5.2}x | iROAS: {:>+6.2}",
            c.campaign, c.revenue, c.total_payout, c.roas, c.iroas
        );
    }

    println!();
    println!("=== TOP {} INFLUENCERS BY REVENUE ===", config.top_n);
    for i in report::top_influencers_by_revenue(view, config.top_n) {
        println!(
            "  {:<22} {:<10} | Revenue: {:>10.0} | ROAS: {:>5.2}x | iROAS: {:>+6.2} | Eng: {:.2}%",
            i.name,
            i.category,
            i.total_revenue,
            i.roas,
            i.iroas,
            i.avg_engagement_rate * 100.0
        );
    }

    let under = report::underperformers(view, config.underperformer_roas_threshold);
    if !under.is_empty() {
        println!();
        println!(
            "=== BELOW {:.1}x ROAS ({} influencers) ===",
            config.underperformer_roas_threshold,
            under.len()
        );
        for i in under {
            println!("  {:<22} | ROAS: {:.2}x | Payout: {:.0}", i.name, i.roas, i.total_payout);
        }
    }
}

/// CLI flags win over the config file.
fn apply_overrides(args: &[String], config: &mut ReportConfig) -> Result<()> {
    config.top_n = parse_arg(args, "--top-n", config.top_n);
    config.underperformer_roas_threshold = parse_arg(
        args,
        "--underperformer-roas",
        config.underperformer_roas_threshold,
    );
    if let Some(value) = flag_value(args, "--payout-attribution") {
        config.campaign_payout = match value {
            "per_post" => PayoutAttribution::PerPost,
            "per_influencer" => PayoutAttribution::PerInfluencer,
            other => anyhow::bail!("unknown payout attribution '{other}'"),
        };
    }
    anyhow::ensure!(config.top_n > 0, "--top-n must be at least 1");
    Ok(())
}

fn filter_from_args(args: &[String], snapshot: &ReportSnapshot) -> FilterSpec {
    let mut spec = FilterSpec::all(snapshot);
    let campaigns = flag_values(args, "--campaign");
    if !campaigns.is_empty() {
        spec = spec.with_campaigns(campaigns);
    }
    let categories = flag_values(args, "--category");
    if !categories.is_empty() {
        spec = spec.with_categories(categories);
    }
    let min = parse_arg(args, "--min-followers", spec.followers.min);
    let max = parse_arg(args, "--max-followers", spec.followers.max);
    spec.with_followers(min, max)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// All values of a repeatable flag, in order.
fn flag_values<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .collect()
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
