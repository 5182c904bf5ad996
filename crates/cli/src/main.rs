//! parcelscope command-line client.
//!
//! Query subcommands talk to a running `parcelscope-server` over HTTP;
//! `cache inspect` reads the durable cache file directly.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use parcelscope_core::AppConfig;
use serde_json::Value;

mod inspect;
mod remote;

/// Package tracking, tariffs and discounts from the carrier's website
#[derive(Parser, Debug)]
#[command(name = "parcelscope")]
#[command(version, about)]
pub struct Cli {
    /// Base URL of the parcelscope server
    #[arg(long, env = "PARCELSCOPE_SERVER", default_value = "http://127.0.0.1:3000", global = true)]
    pub server: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Current status of a package
    Track {
        tracking_number: String,
    },
    /// Tariff information for a destination country
    Tariff {
        country: String,
    },
    /// Current shipping discounts
    Discounts,
    /// Ask the shipping knowledge base
    Kb {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Work with the durable cache file
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Print entry counts and every entry with its freshness
    Inspect {
        /// Cache file; defaults to the configured `cache_path`
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output: Value = match cli.command {
        Command::Track { tracking_number } => remote::Remote::new(&cli.server)?.track(&tracking_number).await?,
        Command::Tariff { country } => remote::Remote::new(&cli.server)?.tariff(&country).await?,
        Command::Discounts => remote::Remote::new(&cli.server)?.discounts().await?,
        Command::Kb { question } => remote::Remote::new(&cli.server)?.kb(&question.join(" ")).await?,
        Command::Cache { command: CacheCommand::Inspect { path } } => {
            let path = match path {
                Some(path) => path,
                None => AppConfig::load()?.cache_path,
            };
            serde_json::to_value(inspect::inspect(&path).await?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
