use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use common::{ForecastQuery, MetricKind, Scenario};
use std::path::PathBuf;
use tracing::debug;

pub mod commands;

use commands::{catalog, forecast, insights, metrics, plan, scenarios, serve};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "evplan")]
#[command(about = "EV demand forecast planning: dashboard API server and reporting CLI")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to an optional `evplan.toml`)
    #[arg(short, long, global = true, env = "EVPLAN_CONFIG")]
    pub config: Option<String>,

    /// Base URL of the forecasting backend
    ///
    /// Overrides `backend.base_url` from the configuration.
    #[arg(long, global = true, env = "EVPLAN_BACKEND_URL")]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Forecast run parameters
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// County name as listed by `evplan catalog`
    #[arg(long)]
    pub county: String,

    /// Model identifier (e.g. xgboost, random_forest)
    #[arg(short, long)]
    pub model: String,

    /// Forecast horizon in months (6 to 60)
    #[arg(long, default_value_t = 36, value_parser = clap::value_parser!(u32).range(6..=60))]
    pub horizon: u32,
}

impl From<QueryArgs> for ForecastQuery {
    fn from(args: QueryArgs) -> Self {
        Self {
            county: args.county,
            model_name: args.model,
            horizon: args.horizon,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard API server
    Serve {
        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long, env = "BIND_ADDRESS")]
        bind_address: Option<String>,
    },
    /// List the counties and models the backend offers
    Catalog,
    /// Show model evaluation metrics and the model ranking
    Metrics {
        /// Only show this model
        #[arg(short, long)]
        model: Option<String>,

        /// Metric used for the ranking: MAE, RMSE or MAPE
        #[arg(long, default_value = "RMSE")]
        rank_by: MetricKind,
    },
    /// Run a forecast and print it
    Forecast {
        #[command(flatten)]
        query: QueryArgs,

        /// Also write the series as CSV to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Infrastructure requirements of a forecast under one scenario
    Plan {
        #[command(flatten)]
        query: QueryArgs,

        /// conservative, baseline or aggressive
        #[arg(short, long, default_value = "baseline")]
        scenario: Scenario,
    },
    /// Compare the adoption scenarios of a forecast
    Scenarios {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Summarize a forecast
    Insights {
        #[command(flatten)]
        query: QueryArgs,
    },
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(url) = &self.backend_url {
            debug!("Backend URL overridden from command line: {}", url);
            settings.backend.base_url = url.clone();
        }
        Ok(settings)
    }

    pub async fn run(self) -> Result<()> {
        let settings = self.settings()?;
        match self.command {
            Commands::Serve { bind_address } => {
                let bind_address = bind_address.unwrap_or_else(|| settings.server.bind_address.clone());
                serve(&settings, &bind_address).await?;
            }
            Commands::Catalog => {
                catalog(&settings).await?;
            }
            Commands::Metrics { model, rank_by } => {
                metrics(&settings, model.as_deref(), rank_by).await?;
            }
            Commands::Forecast { query, export } => {
                forecast(&settings, query.into(), export.as_deref()).await?;
            }
            Commands::Plan { query, scenario } => {
                plan(&settings, query.into(), scenario).await?;
            }
            Commands::Scenarios { query } => {
                scenarios(&settings, query.into()).await?;
            }
            Commands::Insights { query } => {
                insights(&settings, query.into()).await?;
            }
        }
        Ok(())
    }
}
