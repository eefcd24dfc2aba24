//! `turno`: supervision-shift server and maintenance commands.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `TURNO_*` environment variables (nested keys use `__`, e.g.
//! `TURNO_REPORT__CITY`), opens the SQLite store and serves the JSON API
//! under `/api`.

mod settings;

use std::{
  path::PathBuf,
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use axum::Router;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;
use turno_api::{AppState, Service};
use turno_assist::{Assistant, GeminiClient};
use turno_core::{
  clock::{Clock, SystemClock},
  profile::NewProfile,
  shift::{ClosingInput, Shift},
};
use turno_report::{ReportTemplate, Synthesizer};
use turno_store_sqlite::SqliteStore;

use settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Turno supervision-shift server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Create the first administrator; the password is read from stdin.
  BootstrapAdmin {
    #[arg(long)]
    email:     String,
    #[arg(long)]
    grade:     String,
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    phone:     Option<String>,
  },
  /// Delete shifts past their retention period and exit.
  PurgeExpired,
  /// Render the report for a shift document to stdout.
  Render {
    /// JSON file holding one shift document.
    shift:          PathBuf,
    /// Template version; defaults to the configured one.
    #[arg(long)]
    template:       Option<String>,
    /// Overrides the handoff recorded on the shift.
    #[arg(long)]
    handed_to:      Option<String>,
    #[arg(long)]
    routine_cases:  Option<u32>,
    #[arg(long)]
    relevant_cases: Option<u32>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = settings::load(&cli.config)?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(cfg).await,
    Command::BootstrapAdmin { email, grade, full_name, phone } => {
      let password = read_password()?;
      let service = open_service(&cfg).await?;
      let profile = service
        .bootstrap_admin(NewProfile { email, password, grade, full_name, phone })
        .await
        .context("failed to create administrator")?;
      println!("{}", profile.profile_id);
      Ok(())
    }
    Command::PurgeExpired => {
      let service = open_service(&cfg).await?;
      let removed = service.purge_expired(Utc::now()).await.context("purge failed")?;
      println!("{removed}");
      Ok(())
    }
    Command::Render { shift, template, handed_to, routine_cases, relevant_cases } => {
      let raw = std::fs::read_to_string(&shift)
        .with_context(|| format!("failed to read {shift:?}"))?;
      let shift: Shift = serde_json::from_str(&raw).context("not a shift document")?;

      let recorded = shift.closing.as_ref();
      let input = ClosingInput {
        handed_to:      handed_to
          .or_else(|| recorded.map(|c| c.handed_to.clone()))
          .unwrap_or_default(),
        routine_cases:  routine_cases.or(recorded.map(|c| c.routine_cases)).unwrap_or(0),
        relevant_cases: relevant_cases.or(recorded.map(|c| c.relevant_cases)).unwrap_or(0),
      };

      let options = cfg.report.options()?;
      let template = match template {
        Some(tag) => ReportTemplate::parse(&tag)?,
        None => options.template,
      };
      let synthesizer = Synthesizer::new(SystemClock, options);
      print!("{}", synthesizer.render_with(template, &shift, &input));
      Ok(())
    }
  }
}

async fn open_service(cfg: &ServerConfig) -> anyhow::Result<Service<SqliteStore>> {
  let store_path = settings::expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let clock: Arc<dyn Clock> = Arc::new(SystemClock);
  Ok(Service::new(Arc::new(store), clock, cfg.report.options()?))
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let service = Arc::new(open_service(&cfg).await?);

  let assistant = match &cfg.gemini {
    Some(g) => {
      let client = GeminiClient::new(g).context("failed to build completion client")?;
      info!(models = ?g.models, "text assistance enabled");
      Some(Arc::new(Assistant::with_candidates(client, g.models.clone())))
    }
    None => {
      info!("text assistance disabled; no [gemini] section configured");
      None
    }
  };

  if cfg.purge_interval_secs > 0 {
    spawn_purge(service.clone(), Duration::from_secs(cfg.purge_interval_secs));
  }

  let state = AppState { service, assistant };
  let app = Router::new()
    .nest("/api", turno_api::api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", cfg.host, cfg.port);
  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Periodically delete expired shifts. Failures are logged and retried on
/// the next tick.
fn spawn_purge(service: Arc<Service<SqliteStore>>, every: Duration) {
  tokio::spawn(async move {
    let mut interval = tokio::time::interval(every);
    loop {
      interval.tick().await;
      if let Err(e) = service.purge_expired(Utc::now()).await {
        warn!(error = %e, "expired-shift purge failed");
      }
    }
  });
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
