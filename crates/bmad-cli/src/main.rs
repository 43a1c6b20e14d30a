use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::EnvFilter;

use bmad_core::config::Config;
use bmad_core::FilePreferenceStore;
use bmad_core::GateDecision;
use bmad_core::Tier;
use bmad_core::TierTransition;
use bmad_core::WorkspaceSession;
use bmad_exec::route;
use bmad_exec::ApiRequest;
use bmad_exec::Method;
use bmad_exec::RandomPicker;
use bmad_exec::SimulatedPipeline;
use bmad_exec::WorkspaceRuntime;

mod events;
mod ui;

const DEFAULT_LOG_FILTER: &str = "bmad=info,bmad_core=info,bmad_exec=info";
const LOG_FILE_NAME: &str = "bmad.log";

#[derive(Parser)]
#[command(name = "bmad", version)]
#[command(about = "AI developer workspace in the terminal")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides `[storage] data_dir`
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Log to stderr instead of the data dir log file
    #[arg(long, global = true)]
    log_stderr: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the terminal workspace (default)
    Tui,
    /// Print tier, credits and workspace flags
    Status,
    /// Switch to another tier
    Upgrade {
        /// free, pro or enterprise
        tier: String,
    },
    /// Run the request gate N times
    Consume {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },
    /// Route one request through the stub API
    Api {
        method: String,
        path: String,
        body: Option<String>,
    },
    /// Clear every persisted preference
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => Config::default_path(),
    };
    let mut config = match &config_path {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }
    let data_dir = config.data_dir();
    init_tracing(&data_dir, cli.log_stderr)?;
    tracing::debug!(data_dir = %data_dir.display(), "starting");

    let store = FilePreferenceStore::open(&data_dir)
        .with_context(|| format!("opening preferences in {}", data_dir.display()))?;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            let (pipeline, outcomes) =
                SimulatedPipeline::new(config.delays.clone(), RandomPicker::from_entropy());
            let session = WorkspaceSession::open(config, store);
            ui::run(WorkspaceRuntime::new(session, pipeline, outcomes)).await
        }
        Command::Status => {
            print_status(&WorkspaceSession::open(config, store));
            Ok(())
        }
        Command::Upgrade { tier } => {
            let tier: Tier = tier.parse().context("choose free, pro or enterprise")?;
            let mut session = WorkspaceSession::open(config, store);
            match session.upgrade(tier).context("saving tier change")? {
                TierTransition::Unchanged => println!("already on {}", tier.display_name()),
                TierTransition::Changed { from, to } => println!(
                    "{} -> {} ({} credits)",
                    from.display_name(),
                    to.display_name(),
                    session.current_entitlement().credits
                ),
            }
            Ok(())
        }
        Command::Consume { count } => {
            let mut session = WorkspaceSession::open(config, store);
            for attempt in 1..=count {
                let decision = session.try_consume().context("saving credits")?;
                let credits = session.current_entitlement().credits;
                match decision {
                    GateDecision::Allowed { debited: true } => {
                        println!("{attempt}: allowed, {credits} left")
                    }
                    GateDecision::Allowed { debited: false } => {
                        println!("{attempt}: allowed, not metered")
                    }
                    GateDecision::Denied => println!("{attempt}: denied, upgrade required"),
                }
            }
            Ok(())
        }
        Command::Api { method, path, body } => {
            let mut request = ApiRequest::new(Method::parse(&method), path);
            if let Some(body) = body {
                request = request.with_body(body);
            }
            let response = route(&request, chrono::Utc::now(), &config.api.cors_origin);
            println!("HTTP {}", response.status);
            for (name, value) in &response.headers {
                println!("{name}: {value}");
            }
            if let Some(body) = &response.body {
                println!();
                println!("{}", serde_json::to_string_pretty(body)?);
            }
            Ok(())
        }
        Command::Reset => {
            let mut session = WorkspaceSession::new(config, store);
            session.reset().context("clearing preferences")?;
            println!("preferences cleared ({})", session.store().path().display());
            Ok(())
        }
    }
}

fn print_status(session: &WorkspaceSession<FilePreferenceStore>) {
    let state = session.state();
    let entitlement = session.current_entitlement();
    println!("tier:       {}", entitlement.tier.display_name());
    println!("credits:    {}", entitlement.credits);
    if let Some(usage) = entitlement.usage(&session.config().quotas) {
        println!(
            "usage:      {}/{} ({}%, {})",
            usage.remaining,
            usage.max,
            usage.percent_remaining,
            usage.level.label()
        );
    }
    println!("onboarding: {}", if state.onboarding.complete { "complete" } else { "pending" });
    println!("admin mode: {}", if state.admin_mode { "on" } else { "off" });
    println!("store:      {}", session.store().path().display());
}

fn init_tracing(data_dir: &Path, to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;
    let path = data_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
