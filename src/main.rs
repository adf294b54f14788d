use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plant_tracker::config::{Config, DEFAULT_HOST, DEFAULT_PORT};
use plant_tracker::{api, mcp, seed};

#[derive(Parser)]
#[command(name = "plants")]
#[command(about = "Track plants, their pots and soils, and where each plant has lived")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct DatabaseArgs {
    /// SQLite database file (defaults to the platform data directory)
    #[arg(long = "db", env = "PLANT_TRACKER_DB")]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, env = "PLANT_TRACKER_HOST", default_value = DEFAULT_HOST)]
        host: String,

        /// Port for HTTP API
        #[arg(short, long, env = "PLANT_TRACKER_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        #[command(flatten)]
        db: DatabaseArgs,
    },
    /// Start MCP server via stdio
    Mcp {
        #[command(flatten)]
        db: DatabaseArgs,
    },
    /// Fill an empty database with sample soils, pots and plants
    Seed {
        #[command(flatten)]
        db: DatabaseArgs,
    },
    /// Check whether a server is answering
    Status {
        #[arg(long, env = "PLANT_TRACKER_HOST", default_value = DEFAULT_HOST)]
        host: String,

        #[arg(short, long, env = "PLANT_TRACKER_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays free for the MCP transport.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "plant_tracker=debug,plant_tracker_core=debug,tower_http=debug".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { host, port, db }) => {
            serve(Config {
                host,
                port,
                database: db.database,
            })
            .await?;
        }
        Some(Commands::Mcp { db }) => {
            let config = Config {
                database: db.database,
                ..Config::default()
            };
            mcp::run_stdio_server(config.open_database()?).await?;
        }
        Some(Commands::Seed { db }) => {
            let config = Config {
                database: db.database,
                ..Config::default()
            };
            let summary = seed::seed(&config.open_database()?)?;
            println!("Database seeded: {summary}");
        }
        Some(Commands::Status { host, port }) => {
            let url = format!("http://{host}:{port}/api/health");
            match reqwest::get(&url).await {
                Ok(response) if response.status().is_success() => {
                    let body: serde_json::Value = response.json().await?;
                    println!(
                        "Plant Tracker at {host}:{port} is {}",
                        body["status"].as_str().unwrap_or("up")
                    );
                }
                Ok(response) => {
                    anyhow::bail!("Plant Tracker at {host}:{port} answered {}", response.status());
                }
                Err(e) => {
                    anyhow::bail!("Plant Tracker is not reachable at {host}:{port}: {e}");
                }
            }
        }
        None => serve(Config::default()).await?,
    }

    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    tracing::info!("Starting Plant Tracker server on {}", addr);

    let db = config.open_database()?;
    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Plant Tracker listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
