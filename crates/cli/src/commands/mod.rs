//! CLI commands. Each prints one JSON document to stdout.

pub mod evaluate;
pub mod metrics;
pub mod sentiment;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use oipulse_core::{AppConfig, ConfigLoader, ExpiryKind};
use oipulse_risk::AdvisorService;
use oipulse_signals::FileStateStore;
use serde::Serialize;

use crate::fixtures::FixtureSource;

pub use evaluate::{run_evaluate, EvaluateArgs};
pub use metrics::{run_metrics, MetricsArgs};
pub use sentiment::{run_sentiment, SentimentArgs};

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ExpiryArg {
    #[default]
    Weekly,
    Monthly,
}

impl From<ExpiryArg> for ExpiryKind {
    fn from(arg: ExpiryArg) -> Self {
        match arg {
            ExpiryArg::Weekly => Self::Weekly,
            ExpiryArg::Monthly => Self::Monthly,
        }
    }
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory holding the JSON fixture files
    #[arg(short, long, env = "OIPULSE_FIXTURES", default_value = "fixtures")]
    pub fixtures: PathBuf,

    /// Expiry series to read
    #[arg(short, long, value_enum, default_value_t = ExpiryArg::Weekly)]
    pub expiry: ExpiryArg,

    /// File that keeps previous-cycle state between runs
    #[arg(long, env = "OIPULSE_STATE_FILE", default_value = "data/state.json")]
    pub state: PathBuf,

    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Profile overlay (`config/Config.{profile}.toml`), replaces --config
    #[arg(long)]
    pub profile: Option<String>,
}

impl CommonArgs {
    fn load_config(&self) -> Result<AppConfig> {
        match &self.profile {
            Some(profile) => ConfigLoader::load_with_profile(profile),
            None => ConfigLoader::load_from(&self.config),
        }
    }

    pub(crate) fn service(&self) -> Result<AdvisorService<FixtureSource, FileStateStore>> {
        let config = self.load_config()?;
        tracing::debug!(
            fixtures = %self.fixtures.display(),
            state = %self.state.display(),
            "Building advisor service"
        );
        Ok(AdvisorService::new(
            FixtureSource::new(&self.fixtures),
            FileStateStore::new(&self.state),
            config,
        ))
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
