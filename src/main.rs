use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cadlink::{api, config::ServerConfig, document::Document, kernel::MemoryKernel, mcp};

#[derive(Parser)]
#[command(name = "cadlink")]
#[command(about = "Remote command endpoint for a parametric CAD document")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the command endpoint
    Serve {
        /// Host to bind (overrides CADLINK_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides CADLINK_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory for relative STL filenames (overrides CADLINK_EXPORT_DIR)
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Start MCP server via stdio, relaying to a running endpoint
    Mcp,
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "cadlink=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // MCP mode: log to stderr so stdout is clean for protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let kernel =
        MemoryKernel::with_export_dir(&config.export_dir).with_undo_limit(config.undo_depth);
    let document = Document::new(kernel);
    let app = api::create_router(document);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        export_dir = %config.export_dir.display(),
        undo_depth = config.undo_depth,
        "cadlink listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // MCP mode needs stderr for logging since stdout is the protocol channel
    let use_stderr = matches!(cli.command, Some(Commands::Mcp));
    init_tracing(use_stderr);

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            export_dir,
        }) => {
            let mut config = ServerConfig::from_env();
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(export_dir) = export_dir {
                config.export_dir = export_dir;
            }
            serve(config).await?;
        }
        Some(Commands::Mcp) => {
            mcp::run_stdio_server(mcp::CadClient::from_env()).await?;
        }
        None => {
            // Default: start server from the environment
            serve(ServerConfig::from_env()).await?;
        }
    }

    Ok(())
}
