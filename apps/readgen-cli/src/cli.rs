use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use readgen_core::{DEFAULT_CONFIG_FILE, Engine, EngineConfig, ReadmeClient, load_project_config};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "readgen",
    version,
    about = "Generate README files for public GitHub repositories with Gemini"
)]
pub struct Cli {
    /// Path to the config file (defaults apply if it does not exist)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve `POST /api/generate` over HTTP
    Serve {
        /// Address to listen on (overrides `server.bind`)
        #[arg(short, long)]
        bind: Option<String>,

        /// Gemini model (overrides `gemini.model`)
        #[arg(short, long)]
        model: Option<String>,

        /// Gemini API key (defaults to GEMINI_API_KEY, then API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Generate a README for one repository in-process
    Generate {
        /// Repository URL, e.g. https://github.com/owner/repo
        url: String,

        /// Write the README to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the rendered prompt without calling the model
        #[arg(long)]
        dry_run: bool,

        /// Gemini model (overrides `gemini.model`)
        #[arg(short, long)]
        model: Option<String>,

        /// Gemini API key (defaults to GEMINI_API_KEY, then API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Ask a running readgen server to generate a README
    Submit {
        /// Repository URL, e.g. https://github.com/owner/repo
        url: String,

        /// Base URL of the readgen server
        #[arg(short, long, default_value = "http://127.0.0.1:3000")]
        server: String,

        /// Write the README to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Name of the file log channel for this command, if it logs to a file.
    ///
    /// Only the long-running server writes a log file; one-shot commands log
    /// to stderr so stdout stays clean for the README.
    pub fn log_channel(&self) -> Option<&'static str> {
        match self.command {
            Commands::Serve { .. } => Some("serve"),
            Commands::Generate { .. } | Commands::Submit { .. } => None,
        }
    }

    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve {
                bind,
                model,
                api_key,
            } => {
                let project = load_project_config(&self.config)
                    .with_context(|| format!("failed to load {}", self.config.display()))?;
                let bind = bind.unwrap_or(project.server.bind);
                let engine = build_engine(self.config, model, api_key)?;
                crate::server::serve(Arc::new(engine), &bind).await
            }
            Commands::Generate {
                url,
                output,
                dry_run,
                model,
                api_key,
            } => {
                let engine = build_engine(self.config, model, api_key)?;
                let text = if dry_run {
                    engine.preview_prompt(&url).await?.into_inner()
                } else {
                    engine.generate(&url).await?.markdown
                };
                write_output(output.as_deref(), &text)
            }
            Commands::Submit {
                url,
                server,
                output,
            } => {
                let client = ReadmeClient::new(&server)?;
                let result = client
                    .submit(&url)
                    .await
                    .map_err(|e| anyhow!("Failed to generate README: {e}"))?;
                write_output(output.as_deref(), &result.markdown)
            }
        }
    }
}

fn build_engine(
    config_path: PathBuf,
    model: Option<String>,
    api_key: Option<String>,
) -> Result<Engine> {
    let config = EngineConfig::builder()
        .config_path(config_path)
        .model(model)
        .api_key(api_key)
        .build();
    Engine::new(config).context("failed to initialize engine")
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = text.len(), "wrote output");
        }
        None if text.ends_with('\n') => print!("{text}"),
        None => println!("{text}"),
    }
    Ok(())
}
