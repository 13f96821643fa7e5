use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;

use kd_cli::app;
use kd_cli::commands::import::ImportKind;
use kd_cli::commands::whatsapp::Contact;
use kd_cli::commands::{self, parse_scenario, parse_tool};
use kd_cli::config::{Config, DEFAULT_CONFIG_PATH};
use kd_cli::leads::LeadTarget;
use kd_cli::logging::{enable_file_logging, init_logging};
use kd_cli::rates::HttpRateFeed;
use kd_cli::utils::parse_decimal;
use kd_core::lead::MemoryLeadSink;
use kd_core::models::{FormType, Scenario};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Urban-renewal calculators for KD Ankara.
///
/// Inputs and results are kept in the configured store between runs so
/// that one tool can pre-fill the next.
#[derive(Debug, Parser)]
#[command(name = "kd", version)]
struct Cli {
    /// Configuration file. Missing files mean defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Storage backend, overriding `[storage] backend`.
    #[arg(long)]
    backend: Option<String>,

    /// Connection string, overriding `[storage] connection_string`.
    /// For SQLite this is a file path (e.g. `kd.db`) or `:memory:`.
    #[arg(long)]
    db: Option<String>,

    /// Log level or filter directive, overriding `[logging] level`.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate a tool and save the result.
    Calc {
        /// emsal, daire, paylasim, maliyet, destek, takvim, arsapayi or muteahhit-mini
        #[arg(value_parser = parse_tool)]
        tool: FormType,

        /// Inputs as a JSON object; replaces the saved inputs.
        #[arg(long, conflicts_with = "input_file")]
        input: Option<String>,

        /// Read the JSON inputs from a file.
        #[arg(long)]
        input_file: Option<PathBuf>,

        /// Owner-share scenario (paylasim only).
        #[arg(long, value_parser = parse_scenario)]
        scenario: Option<Scenario>,
    },

    /// Pre-fill a tool from another tool's last result.
    Handoff {
        #[arg(value_parser = parse_tool)]
        from: FormType,
        #[arg(value_parser = parse_tool)]
        to: FormType,
    },

    /// Print a tool's saved inputs and last result.
    Show {
        #[arg(value_parser = parse_tool)]
        tool: FormType,
    },

    /// Forget saved inputs and results; every tool when none is given.
    Clear {
        #[arg(value_parser = parse_tool)]
        tool: Option<FormType>,
    },

    /// Load a CSV list into a tool's inputs.
    Import {
        file: PathBuf,
        #[arg(long, value_enum)]
        kind: ImportKind,
    },

    /// Submit the five-step pre-analysis request from a TOML form.
    Wizard {
        form: PathBuf,
        /// Print the request instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Ask for a detailed report on a tool's last result.
    Lead {
        #[arg(value_parser = parse_tool)]
        tool: FormType,
        /// Contact form as TOML.
        form: PathBuf,
        /// Print the request instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a WhatsApp link carrying a tool's last result.
    Whatsapp {
        #[arg(value_parser = parse_tool)]
        tool: FormType,
        #[arg(long)]
        district: String,
        #[arg(long)]
        neighborhood: String,
        /// e.g. arsa or bina
        #[arg(long, default_value = "arsa")]
        kind: String,
        #[arg(long)]
        phone: String,
        /// Land area in m², defaults to the saved emsal input.
        #[arg(long, value_parser = parse_decimal)]
        land_area: Option<Decimal>,
        /// Floor-area ratio, defaults to the saved emsal input.
        #[arg(long, value_parser = parse_decimal)]
        emsal: Option<Decimal>,
    },

    /// Show market rates.
    Rates {
        /// Keep polling until Ctrl-C.
        #[arg(long)]
        watch: bool,
    },
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(db) = cli.db {
        config.storage.connection_string = db;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging.level);
    if let Some(path) = &config.logging.file {
        enable_file_logging(path)?;
    }

    let output = match cli.command {
        Command::Rates { watch } => {
            let feed = HttpRateFeed::new(config.rates.endpoint.clone());
            if watch {
                let interval = Duration::from_secs(config.rates.interval_secs.max(1));
                return commands::rates::watch(Arc::new(feed), interval).await;
            }
            commands::rates::once(&feed).await?
        }
        command => run(command, &config).await?,
    };

    println!("{output}");
    Ok(())
}

async fn run(
    command: Command,
    config: &Config,
) -> Result<String> {
    debug!("opening {} store", config.storage.backend);
    let store = app::open_store(&config.storage).await?;

    let output = match command {
        Command::Calc {
            tool,
            input,
            input_file,
            scenario,
        } => {
            let input = match input_file {
                Some(path) => Some(read_file(&path)?),
                None => input,
            };
            commands::calc::run(&store, tool, input.as_deref(), scenario).await?
        }
        Command::Handoff { from, to } => commands::handoff::run(&store, from, to).await?,
        Command::Show { tool } => commands::store::show(&store, tool).await?,
        Command::Clear { tool } => commands::store::clear(&store, tool).await,
        Command::Import { file, kind } => commands::import::run(&store, &file, kind).await?,
        Command::Wizard { form, dry_run } => {
            let form = read_file(&form)?;
            if dry_run {
                let sink = MemoryLeadSink::new();
                commands::wizard::run(&form, &sink).await?;
                dump(&sink)?
            } else {
                let target = LeadTarget::from_config(&config.leads);
                debug!("sending pre-analysis request to {target}");
                let sink = target.into_sink();
                commands::wizard::run(&form, sink.as_ref()).await?
            }
        }
        Command::Lead {
            tool,
            form,
            dry_run,
        } => {
            let form = read_file(&form)?;
            if dry_run {
                commands::lead::build(&store, tool, &form).await?.to_json()?
            } else {
                let target = LeadTarget::from_config(&config.leads);
                debug!("sending lead to {target}");
                let sink = target.into_sink();
                commands::lead::run(&store, tool, &form, sink.as_ref()).await?
            }
        }
        Command::Whatsapp {
            tool,
            district,
            neighborhood,
            kind,
            phone,
            land_area,
            emsal,
        } => {
            let contact = Contact {
                district,
                neighborhood,
                property_kind: kind,
                phone,
                land_area,
                floor_area_ratio: emsal,
            };
            commands::whatsapp::run(&store, tool, contact).await?
        }
        Command::Rates { .. } => bail!("rates do not use the store"),
    };
    Ok(output)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn dump(sink: &MemoryLeadSink) -> Result<String> {
    let lines = sink
        .submissions()
        .iter()
        .map(|submission| submission.to_json())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}
