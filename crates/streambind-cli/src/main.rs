//! streambind demo CLI
//!
//! `serve` runs a local SSE endpoint emitting a random number every second;
//! `watch` binds to an SSE endpoint and prints every observed result
//! transition. Run both in two terminals for an end-to-end demo.

use clap::{Parser, Subcommand};

mod serve;
mod watch;

#[derive(Parser)]
#[command(name = "streambind", about = "Reactive SSE stream bindings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve a demo SSE endpoint
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 8888)]
        port: u16,
    },
    /// Watch an SSE endpoint and print result transitions
    Watch {
        /// Stream URL, e.g. http://localhost:8888?event=custom-event
        url: String,
        /// Event name to listen for (default: the generic message event)
        #[arg(long)]
        event: Option<String>,
        /// Print raw payloads without the JSON transform
        #[arg(long)]
        raw: bool,
        /// Send credentials (cookies) with the stream request
        #[arg(long)]
        with_credentials: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => tokio::task::spawn_blocking(move || serve::run(port)).await?,
        Command::Watch {
            url,
            event,
            raw,
            with_credentials,
        } => watch::run(url, event, raw, with_credentials).await,
    }
}
