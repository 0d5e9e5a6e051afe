//! CLI entrypoint for the Aspendos council
//!
//! Wires the layers together with dependency injection, runs one
//! deliberation, and streams progress to the terminal.

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use council_application::{
    BreakerStateSource, InsightsUseCase, LlmGateway, MemoryGateway, ModelResolver,
    RunCouncilUseCase, SelectPersonaUseCase, SessionStore, SynthesizeUseCase,
};
use council_domain::{
    CouncilEvent, InsightsReport, Persona, ResponseUnit, SessionStatus, UnitStatus, UserId,
    display_label, model_info,
};
use council_infrastructure::{
    BreakerRecordingGateway, ConfigLoader, InMemoryMemoryGateway, InMemorySessionStore,
    OpenRouterGateway, ProviderBreakerBoard,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aspendos-council", version, about)]
struct Cli {
    /// The question to put before the council
    question: String,

    /// User identity for preference learning and memory
    #[arg(long, default_value = "local")]
    user: String,

    /// Skip the synthesis step after deliberation
    #[arg(long)]
    no_synthesis: bool,

    /// Record which persona's answer you preferred
    #[arg(long, value_name = "PERSONA")]
    pick: Option<Persona>,

    /// Print selection insights after the run
    #[arg(long)]
    insights: bool,

    /// Explicit config file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ignore all config files and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress per-persona progress output
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _log_guard = init_logging(filter, cli.log_file.as_deref())?;

    info!("Starting Aspendos council");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };

    // === Dependency injection ===
    let Some(gateway_config) = config.gateway.to_gateway_config() else {
        bail!(
            "No API key found. Set {} or [gateway].api_key in council.toml",
            config.gateway.api_key_env
        );
    };
    let board = Arc::new(ProviderBreakerBoard::new(config.breaker.to_breaker_config()));
    let gateway: Arc<dyn LlmGateway> = Arc::new(BreakerRecordingGateway::new(
        Arc::new(OpenRouterGateway::new(gateway_config)?),
        Arc::clone(&board),
    ));
    let resolver = Arc::new(ModelResolver::new(
        board as Arc<dyn BreakerStateSource>,
        config.routing.to_fallback_chains(),
    ));
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let memory: Arc<dyn MemoryGateway> = Arc::new(InMemoryMemoryGateway::new());

    let user = UserId::new(cli.user.clone());
    let run = RunCouncilUseCase::new(
        Arc::clone(&gateway),
        Arc::clone(&store),
        Arc::clone(&memory),
        resolver,
    );

    if !cli.quiet {
        println!();
        println!("{}", "The council is deliberating...".bold());
        println!();
    }

    let mut handle = run.execute(user.clone(), &cli.question).await?;
    let session_id = handle.session.id.clone();

    let mut drafts: HashMap<Persona, String> = HashMap::new();
    let mut final_status = SessionStatus::Pending;
    while let Some(event) = handle.next_event().await {
        render_event(&event, &mut drafts, &mut final_status, cli.quiet);
    }
    handle.wait().await;

    if final_status == SessionStatus::Failed && !cli.quiet {
        println!("{}", "Some council members could not answer.".yellow());
        println!();
    }

    if !cli.quiet {
        match store.units_for(&session_id).await {
            Ok(units) => print_run_summary(&units),
            Err(e) => eprintln!("{}", format!("Run summary unavailable: {e}").yellow()),
        }
    }

    if !cli.no_synthesis {
        let synthesize = SynthesizeUseCase::new(Arc::clone(&gateway), Arc::clone(&store))
            .with_moderator(config.council.moderator_model());
        match synthesize.execute(&session_id).await {
            Ok(outcome) => {
                println!("{}", "=== Synthesis ===".bold());
                println!("{}", outcome.text);
                println!();
            }
            Err(e) => eprintln!("{}", format!("Synthesis unavailable: {e}").yellow()),
        }
    }

    if let Some(persona) = cli.pick {
        SelectPersonaUseCase::new(Arc::clone(&store), Arc::clone(&memory))
            .execute(&session_id, &user, persona)
            .await?;
        println!(
            "Recorded your preference for {}.",
            persona.definition().display_name
        );
    }

    if cli.insights {
        let report = InsightsUseCase::new(Arc::clone(&store)).execute(&user).await?;
        print_insights(&report);
    }

    Ok(())
}

fn init_logging(
    filter: EnvFilter,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
        return Ok(None);
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .context("Log file path has no file name")?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir,
        file_name.to_os_string(),
    ));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn render_event(
    event: &CouncilEvent,
    drafts: &mut HashMap<Persona, String>,
    final_status: &mut SessionStatus,
    quiet: bool,
) {
    match event {
        CouncilEvent::UnitStatusChanged {
            persona,
            status: UnitStatus::Streaming,
        } => {
            if !quiet {
                println!(
                    "{}",
                    format!("{} is deliberating...", persona.definition().display_name).dimmed()
                );
            }
        }
        CouncilEvent::UnitStatusChanged { .. } => {}
        CouncilEvent::ChunkAppended { persona, text } => {
            drafts.entry(*persona).or_default().push_str(text);
        }
        CouncilEvent::UnitCompleted { persona, latency_ms, .. } => {
            let definition = persona.definition();
            println!();
            println!(
                "{} {}",
                format!("=== {} ===", definition.display_name)
                    .color(definition.accent_color)
                    .bold(),
                format!("({} ms)", latency_ms).dimmed()
            );
            if let Some(text) = drafts.get(persona) {
                println!("{}", text);
            }
            println!();
        }
        CouncilEvent::UnitFailed { persona, reason } => {
            println!(
                "{}",
                format!(
                    "{} could not answer: {}",
                    persona.definition().display_name,
                    reason
                )
                .red()
            );
        }
        CouncilEvent::SessionStatusChanged { status } => {
            *final_status = *status;
        }
    }
}

/// Per-persona model, token, and estimated-cost recap for one run.
fn print_run_summary(units: &[ResponseUnit]) {
    let mut total_tokens = 0u64;
    let mut total_cost = 0.0f64;
    let mut priced_every_unit = true;

    println!("{}", "=== Run summary ===".dimmed());
    for unit in units {
        let Some(model) = &unit.resolved_model else {
            continue;
        };
        let usage = unit.usage.unwrap_or_default();
        total_tokens += usage.total();
        let cost = match model_info(model) {
            Some(info) => {
                let cost = info.estimated_cost(&usage);
                total_cost += cost;
                format!("~${cost:.4}")
            }
            None => {
                priced_every_unit = false;
                "cost unknown".to_string()
            }
        };
        println!(
            "{}",
            format!(
                "{}: {} · {} tokens · {}",
                unit.persona.definition().display_name,
                display_label(model),
                usage.total(),
                cost
            )
            .dimmed()
        );
    }
    let total = if priced_every_unit {
        format!("Total: {} tokens · ~${:.4}", total_tokens, total_cost)
    } else {
        format!("Total: {} tokens", total_tokens)
    };
    println!("{}", total.dimmed());
    println!();
}

fn print_insights(report: &InsightsReport) {
    println!("{}", "=== Selection insights ===".bold());
    match report {
        InsightsReport::NoData { message } => println!("{}", message),
        InsightsReport::Computed(insights) => {
            println!("Diversity score: {}/100", insights.diversity_score);
            if let Some(persona) = insights.dominant_persona {
                println!("Dominant persona: {}", persona.definition().display_name);
            }
            let mut shares: Vec<(&Persona, &f64)> = insights.per_persona_score.iter().collect();
            shares.sort_by(|a, b| b.1.total_cmp(a.1));
            for (persona, share) in shares {
                println!("  {:<12} {:>5.1}%", persona.as_str(), share);
            }
            println!("{}", insights.recommendation);
        }
    }
}
