//! `reveng`: generate POJO/DAO sources from a database schema described by a properties file.
//!
//! `reveng generate --config reveng.properties`

use anyhow::Context;
use clap::{Parser, Subcommand};
use reveng_tools::{generate, inspect, load_settings, snapshot, GenerationRequest, SettingKey, Settings};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "reveng", version, about = "Reverse-engineer a schema into POJO and DAO sources")]
struct Cli {
    /// Settings file: Java properties, or `hibernate.cfg.xml` when it ends in `.xml`.
    #[arg(long, short, global = true, default_value = "reveng.properties")]
    config: PathBuf,

    /// Connection URL used when the settings file leaves `connection.url` blank.
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and write sources.
    Generate,
    /// Print the classified entity model as JSON.
    Inspect,
    /// Write the introspected schema as a JSON snapshot for offline runs.
    Snapshot {
        /// Output file; stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// `connection.url` from the settings file wins over `--database-url`.
fn apply_database_url(settings: &mut Settings, database_url: Option<&str>) {
    let url_key = SettingKey::ConnectionUrl.name();
    if settings.raw(url_key).is_some() {
        return;
    }
    if let Some(url) = database_url {
        tracing::debug!("using --database-url for {}", url_key);
        settings.insert(url_key, url);
    }
}

fn request(cli: &Cli) -> anyhow::Result<GenerationRequest> {
    let mut settings = load_settings(&cli.config)?;
    apply_database_url(&mut settings, cli.database_url.as_deref());
    Ok(GenerationRequest::from_settings(&settings)?)
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let request = request(&cli)?;
    match cli.command {
        Command::Generate => {
            let report = generate(&request).await?;
            for path in report.written_files() {
                tracing::debug!(path = %path.display(), "written");
            }
            for (exporter, error) in report.failures() {
                eprintln!("{} export failed: {}", exporter, error);
            }
            tracing::info!(
                entities = report.entities.len(),
                files = report.written_files().count(),
                success = report.is_success(),
                "generation finished"
            );
            Ok(if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Inspect => {
            let entities = inspect(&request).await?;
            println!("{}", serde_json::to_string_pretty(&entities)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Snapshot { output } => {
            let snapshot = snapshot(&request).await?;
            let json = serde_json::to_string_pretty(&snapshot)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), tables = snapshot.tables.len(), "snapshot written");
                }
                None => println!("{}", json),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("reveng_tools=info,reveng=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
