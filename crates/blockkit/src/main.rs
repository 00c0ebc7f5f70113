/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! blockkit CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "blockkit")]
#[command(version)]
#[command(about = "Render directive templates and blocks", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./blockkit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template file against a JSON context
    Render {
        /// Template file
        template: PathBuf,

        /// JSON file providing the render context
        #[arg(short = 'c', long)]
        context: Option<PathBuf>,

        /// Report recoverable problems as errors
        #[arg(long)]
        strict: bool,

        /// Diagnostic output format
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        diagnostics: String,
    },

    /// Create a block from a JSON file and render it
    Block {
        /// Block JSON file
        block: PathBuf,

        /// Block-type registry (YAML or JSON)
        #[arg(short = 'r', long)]
        registry: Option<PathBuf>,

        /// Diagnostic output format
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        diagnostics: String,
    },

    /// Inspect block-type registries
    Registry {
        #[command(subcommand)]
        command: RegistryCommands,
    },
}

#[derive(Subcommand)]
enum RegistryCommands {
    /// Load a registry file and report problems in its definitions
    Check {
        /// Registry file (YAML or JSON)
        registry: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blockkit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            template,
            context,
            strict,
            diagnostics,
        } => commands::render::execute(
            commands::render::RenderArgs {
                template,
                context,
                strict,
                json_diagnostics: diagnostics == "json",
            },
            &config,
        ),
        Commands::Block {
            block,
            registry,
            diagnostics,
        } => commands::block::execute(
            commands::block::BlockArgs {
                block,
                registry,
                json_diagnostics: diagnostics == "json",
            },
            &config,
        ),
        Commands::Registry {
            command: RegistryCommands::Check { registry },
        } => commands::registry::check(&registry),
    }
}
