//! gemini-desk - chat, image captions, embeddings and Q&A on top of Gemini
//!
//! Runs an interactive terminal by default, or an HTTP API with `--serve`.
//! The only required configuration is `config.json` with `GOOGLE_API_KEY`.

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use gemini_desk::config::{self, ApiKey};
use gemini_desk::gemini::{
    DEFAULT_BASE_URL, DEFAULT_EMBEDDING_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_TIMEOUT_SECS,
    DEFAULT_VISION_MODEL, GeminiClient, GeminiSettings, GenerativeApi,
};
use gemini_desk::repl::{self, colors};
use gemini_desk::server;

#[derive(Parser)]
#[command(name = "gemini-desk")]
#[command(about = "Chat, image captions, embeddings and Q&A on top of Gemini")]
struct Args {
    /// Path to config.json (defaults to the one next to the executable)
    #[arg(long, env = "GEMINI_DESK_CONFIG")]
    config: Option<PathBuf>,

    /// Run as HTTP server instead of the interactive terminal
    #[arg(long)]
    serve: bool,

    /// HTTP server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// HTTP server port
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Model for chat and Q&A
    #[arg(long, env = "GEMINI_TEXT_MODEL", default_value = DEFAULT_TEXT_MODEL)]
    text_model: String,

    /// Model for image captions
    #[arg(long, env = "GEMINI_VISION_MODEL", default_value = DEFAULT_VISION_MODEL)]
    vision_model: String,

    /// Model for embeddings
    #[arg(long, env = "GEMINI_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// API base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Args {
    fn settings(&self) -> GeminiSettings {
        GeminiSettings {
            base_url: self.base_url.clone(),
            text_model: self.text_model.clone(),
            vision_model: self.vision_model.clone(),
            embedding_model: self.embedding_model.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Read the credential or stop the process with a single diagnostic
fn load_credential_or_exit(path: &std::path::Path) -> ApiKey {
    match config::load_credential(path) {
        Ok(key) => key,
        Err(e) => {
            let line = e.diagnostic();
            if std::io::stderr().is_terminal() {
                eprintln!("{}", colors::error(&line));
            } else {
                eprintln!("{}", line);
            }
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Terminal mode keeps logs quiet so they don't interleave with chat output
    let default_level = match (args.verbose, args.serve) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let api_key = load_credential_or_exit(&config_path);
    info!("Loaded credential from {}", config_path.display());

    let settings = args.settings();
    let client = GeminiClient::new(api_key, settings.clone())?;
    let api: Arc<dyn GenerativeApi> = Arc::new(client);

    if args.serve {
        return server::run(&args.host, args.port, api).await;
    }

    println!();
    println!("{}", colors::banner_accent(&format!("  gemini-desk {}", env!("CARGO_PKG_VERSION"))));
    println!("{}", colors::separator(50));
    println!("{}", colors::banner_line("Chat", &settings.text_model));
    println!("{}", colors::banner_line("Vision", &settings.vision_model));
    println!("{}", colors::banner_line("Embeddings", &settings.embedding_model));
    println!("{}", colors::separator(50));

    repl::Repl::new(api)?.run().await
}
