//! Server configuration, deserialised from `config.toml` layered with
//! `TURNO_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use turno_assist::GeminiConfig;
use turno_report::{DEFAULT_UTC_OFFSET_MINUTES, ReportOptions, ReportTemplate};

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// Seconds between expired-shift purges; 0 disables the task.
  #[serde(default = "default_purge_interval")]
  pub purge_interval_secs: u64,
  #[serde(default)]
  pub report:              ReportConfig,
  /// Text assistance is disabled when absent.
  #[serde(default)]
  pub gemini:              Option<GeminiConfig>,
}

/// Deployment boilerplate for rendered reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
  pub recipient:          String,
  pub garrison:           String,
  pub city:               String,
  /// Minutes east of UTC.
  pub utc_offset_minutes: i32,
  pub template:           String,
}

impl Default for ReportConfig {
  fn default() -> Self {
    let defaults = ReportOptions::default();
    Self {
      recipient:          defaults.recipient,
      garrison:           defaults.garrison,
      city:               defaults.city,
      utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
      template:           defaults.template.to_string(),
    }
  }
}

impl ReportConfig {
  pub fn options(&self) -> turno_report::Result<ReportOptions> {
    let options = ReportOptions {
      recipient: self.recipient.clone(),
      garrison: self.garrison.clone(),
      city: self.city.clone(),
      template: ReportTemplate::parse(&self.template)?,
      ..ReportOptions::default()
    };
    options.with_offset_minutes(self.utc_offset_minutes)
  }
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("turno.db") }

fn default_purge_interval() -> u64 { 3600 }

/// Read `path` (optional) and the environment into a [`ServerConfig`].
pub fn load(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("TURNO").separator("__"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
