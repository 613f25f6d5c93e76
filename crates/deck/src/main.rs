#![forbid(unsafe_code)]

mod feedback;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use swipedeck_core::config::{load_config, EngineConfig};
use swipedeck_core::roster::{check_roster, load_roster};
use swipedeck_core::types::{Candidate, DragVector};
use swipedeck_engine::gesture::GestureClassifier;
use swipedeck_engine::replay::{self, load_script, ReplayReport};
use swipedeck_engine::stack::CandidateStack;

use feedback::{CueMapper, FeedbackCue, TracingFeedback};

#[derive(Parser)]
#[command(
    name = "deck",
    version,
    about = "Swipe-deck decision engine: classify drags, replay sessions, check rosters."
)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Classify a drag vector into a preview and a commitment.
    Classify {
        /// Horizontal displacement; positive is right.
        #[arg(long, allow_negative_numbers = true)]
        dx: f64,

        /// Vertical displacement; negative is up.
        #[arg(long, allow_negative_numbers = true)]
        dy: f64,

        /// Output JSON.
        #[arg(long)]
        json: bool,

        /// Engine config JSON (defaults if omitted).
        #[arg(long)]
        config: Option<String>,
    },

    /// Replay a scripted session against a roster.
    Replay {
        /// Roster .json file.
        roster: String,

        /// Script .json file.
        script: String,

        /// Seed for match rolls and shuffled refreshes.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Output the full report as JSON.
        #[arg(long)]
        json: bool,

        /// Engine config JSON (defaults if omitted).
        #[arg(long)]
        config: Option<String>,
    },

    /// Show the deck as it would be stacked.
    List {
        /// Roster .json file.
        roster: String,

        /// Show only the top N cards.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Check a roster for duplicate ids and blank fields.
    Check {
        /// Roster .json file.
        roster: String,

        /// Output structured JSON report.
        #[arg(long)]
        json: bool,
    },

    /// Print the default engine config.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Cmd::Classify {
            dx,
            dy,
            json,
            config,
        } => cmd_classify(dx, dy, json, config.as_deref()),

        Cmd::Replay {
            roster,
            script,
            seed,
            json,
            config,
        } => cmd_replay(&roster, &script, seed, json, config.as_deref()),

        Cmd::List { roster, limit } => cmd_list(&roster, limit),

        Cmd::Check { roster, json } => cmd_check(&roster, json),

        Cmd::Config => cmd_config(),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn engine_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(EngineConfig::default()),
    }
}

fn cmd_classify(dx: f64, dy: f64, json_out: bool, config: Option<&str>) -> Result<()> {
    let config = engine_config(config)?;
    let classifier = GestureClassifier::new(config.gestures);
    let drag = DragVector::new(dx, dy);
    let preview = classifier.preview(drag);
    let commitment = classifier.commit(drag);

    if json_out {
        let out = serde_json::json!({
            "drag": drag,
            "preview": preview,
            "commitment": commitment,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "preview:    {}",
            preview.kind().map_or("neutral", |k| k.as_str())
        );
        println!(
            "commitment: {}",
            commitment.kind().map_or("snap_back", |k| k.as_str())
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct ReplayOutput<'a> {
    #[serde(flatten)]
    report: &'a ReplayReport,
    cues: Vec<FeedbackCue>,
}

fn cmd_replay(
    roster_path: &str,
    script_path: &str,
    seed: u64,
    json_out: bool,
    config: Option<&str>,
) -> Result<()> {
    let config = engine_config(config)?;
    let roster = load_roster(roster_path)?;
    let script = load_script(script_path)?;
    let report = replay::run(roster, &script, &config, seed)
        .with_context(|| format!("replay of {script_path} failed"))?;
    let cues = CueMapper::default().play_all(&report.events, &mut TracingFeedback);

    if json_out {
        let out = ReplayOutput {
            report: &report,
            cues,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let ids: Vec<_> = report.stack.iter().map(|c| c.as_str()).collect();
    println!("stack:    {} ({} left)", join_or_dash(&ids), ids.len());
    println!("approved: {}", names(&report.buckets.approved));
    println!("rejected: {}", names(&report.buckets.rejected));
    println!("strong:   {}", names(&report.buckets.strongly_approved));
    let matches: Vec<_> = report.matches.iter().map(|c| c.as_str()).collect();
    println!("matches:  {}", join_or_dash(&matches));
    println!("undo:     {}", if report.can_undo { "available" } else { "-" });
    for r in &report.refused {
        eprintln!("  refused step {}: {}", r.step, r.reason);
    }
    Ok(())
}

fn names(candidates: &[Candidate]) -> String {
    let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
    join_or_dash(&names)
}

fn join_or_dash(items: &[&str]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn cmd_list(roster_path: &str, limit: Option<usize>) -> Result<()> {
    let roster = load_roster(roster_path)?;
    let stack =
        CandidateStack::new(roster).with_context(|| format!("{roster_path}: invalid deck"))?;
    let layers = stack.layers(limit.unwrap_or(stack.len()));
    if layers.is_empty() {
        println!("(empty deck)");
        return Ok(());
    }

    let w_id = layers
        .iter()
        .map(|l| l.candidate.as_str().len())
        .max()
        .unwrap_or(2)
        .max(2);
    let w_name = stack
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(4)
        .max(4);
    println!(
        "{:<5}  {:<w_id$}  {:<w_name$}  {:<5}  OFFSET",
        "DEPTH", "ID", "NAME", "SCALE"
    );
    println!(
        "{:<5}  {:<w_id$}  {:<w_name$}  {:<5}  ------",
        "-----",
        "-".repeat(w_id),
        "-".repeat(w_name),
        "-----"
    );
    for (layer, candidate) in layers.iter().zip(stack.iter()) {
        println!(
            "{:<5}  {:<w_id$}  {:<w_name$}  {:<5.2}  {}",
            layer.depth,
            layer.candidate.as_str(),
            candidate.name,
            layer.scale,
            layer.offset_y
        );
    }
    Ok(())
}

fn cmd_check(roster_path: &str, json_out: bool) -> Result<()> {
    let roster = load_roster(roster_path)?;
    let report = check_roster(roster_path, &roster);

    if json_out {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if report.pass {
            eprintln!("  ok  {roster_path} ({} candidates)", report.candidates);
        } else {
            eprintln!("  FAIL {roster_path} ({} candidates)", report.candidates);
        }
        for e in &report.errors {
            eprintln!("  error {}: {}", e.code, e.message);
        }
    }

    if !report.pass {
        bail!("check failed for {roster_path}");
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&EngineConfig::default())?
    );
    Ok(())
}
