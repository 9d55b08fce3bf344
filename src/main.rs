//! Rhetoric analyzer CLI entry point.
//!
//! Provides `analyze` for one-shot analysis, `interactive` for a session that
//! analyzes one pasted text after another, and `prompt` to print the
//! instruction template sent to the model.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines};
use tracing::{debug, info};

use rhetoric_analyzer::config::{Config, API_KEY_ENV};
use rhetoric_analyzer::logging::{self, LoggingGuard};
use rhetoric_analyzer::prompt::system_prompt;
use rhetoric_analyzer::providers::gemini::GeminiClient;
use rhetoric_analyzer::render::{self, RenderOptions, END_OF_TEXT_MARKER};
use rhetoric_analyzer::session::{Session, SessionState};

/// Detect populist and manipulative rhetoric in text.
#[derive(Parser)]
#[command(name = "rhetoric-analyzer", version, about)]
struct Cli {
    /// Path to a config file (default: ~/.rhetoric-analyzer/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Analyze one text and print the report.
    Analyze {
        /// Text to analyze. Read from stdin when neither --text nor --file is given.
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Read the text to analyze from a file.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Gemini API key (default: $GEMINI_API_KEY).
        #[arg(long)]
        api_key: Option<String>,
        /// Print the analysis as JSON instead of a report.
        #[arg(long)]
        json: bool,
        /// Disable coloured output.
        #[arg(long)]
        no_color: bool,
    },
    /// Analyze texts one after another in a single session.
    Interactive {
        /// Gemini API key (default: $GEMINI_API_KEY, else asked for once).
        #[arg(long)]
        api_key: Option<String>,
        /// Disable coloured output.
        #[arg(long)]
        no_color: bool,
    },
    /// Print the instruction template sent with every text.
    Prompt,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let _logging_guard = init_logging(&config)?;

    match cli.command {
        Command::Analyze {
            text,
            file,
            api_key,
            json,
            no_color,
        } => handle_analyze(&config, text, file.as_deref(), api_key, json, no_color).await,
        Command::Interactive { api_key, no_color } => {
            handle_interactive(&config, api_key, no_color).await
        }
        Command::Prompt => {
            println!("{}", system_prompt());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(config: &Config) -> anyhow::Result<Option<LoggingGuard>> {
    match &config.logging.dir {
        Some(dir) => logging::init_with_file(dir, &config.logging.level).map(Some),
        None => logging::init_cli(&config.logging.level).map(|()| None),
    }
}

fn build_session(config: &Config) -> Session {
    let mut client = GeminiClient::new(config.model.name.clone(), config.model.base_url.clone());
    if let Some(timeout) = config.model.request_timeout() {
        client = client.with_timeout(timeout);
    }
    debug!(endpoint = %client.endpoint(), "generator configured");
    Session::new(Arc::new(client))
}

fn render_options(no_color: bool) -> RenderOptions {
    RenderOptions {
        color: !no_color
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal(),
    }
}

fn resolve_api_key(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var(API_KEY_ENV).ok())
}

/// Analyze one text and exit non-zero on failure.
async fn handle_analyze(
    config: &Config,
    text: Option<String>,
    file: Option<&Path>,
    api_key: Option<String>,
    json: bool,
    no_color: bool,
) -> anyhow::Result<ExitCode> {
    let raw_text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read text from stdin")?;
            buf
        }
    };
    let credential = resolve_api_key(api_key).unwrap_or_default();

    let session = build_session(config);
    let state = session.submit(&raw_text, &credential).await;
    let opts = render_options(no_color);

    match &state {
        SessionState::Result(result) if json => {
            println!("{}", render::render_json(result).context("failed to encode analysis")?);
        }
        SessionState::Error(_) => {
            eprintln!("{}", render::render(&state, opts));
            return Ok(ExitCode::FAILURE);
        }
        other => print!("{}", render::render(other, opts)),
    }
    Ok(ExitCode::SUCCESS)
}

/// Run a session until stdin closes.
async fn handle_interactive(
    config: &Config,
    api_key: Option<String>,
    no_color: bool,
) -> anyhow::Result<ExitCode> {
    let opts = render_options(no_color);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let credential = match resolve_api_key(api_key) {
        Some(key) => key,
        None => {
            prompt_line("Gemini API key: ").await?;
            lines.next_line().await?.unwrap_or_default()
        }
    };

    let session = build_session(config);
    info!("interactive session started");

    loop {
        println!("\n{}", render::render(&SessionState::Idle, opts));
        let Some(block) = read_block(&mut lines).await? else {
            break;
        };

        println!("{}", render::render(&SessionState::Loading, opts));
        let state = session.submit(&block, &credential).await;
        println!("{}", render::render(&state, opts));
    }

    info!("interactive session ended");
    Ok(ExitCode::SUCCESS)
}

async fn prompt_line(text: &str) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// Read lines up to the end-of-text marker or EOF. Blank lines stay part of
/// the text. `None` once stdin is exhausted and nothing but blank lines was
/// read.
async fn read_block<R>(lines: &mut Lines<R>) -> anyhow::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut block: Vec<String> = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == END_OF_TEXT_MARKER {
            return Ok(Some(block.join("\n")));
        }
        block.push(line);
    }

    if block.iter().all(|line| line.trim().is_empty()) {
        Ok(None)
    } else {
        Ok(Some(block.join("\n")))
    }
}
