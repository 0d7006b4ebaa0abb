//! afterapp - full-stack app server with convention-based file routing for API modules

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use afterapp::config::{Config, Mode};
use afterapp::{app, build, server};

#[derive(Parser)]
#[command(name = "afterapp")]
#[command(about = "Full-stack app server with convention-based file routing for API modules")]
#[command(version)]
struct Cli {
    /// Project root directory
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load API routes and start the HTTP server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Run in production mode (overrides APP_ENV)
        #[arg(long)]
        production: bool,
    },

    /// List the bindings the route loader would install
    Routes {
        /// Scan the compiled route tree instead of the sources
        #[arg(long)]
        production: bool,
    },

    /// Emit the compiled route tree used in production
    Build,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("afterapp={},tower_http=debug", log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    let _ = dotenvy::from_path(cli.root.join(".env"));

    let mut config = Config::load(cli.root.clone())?;
    let registry = app::registry();

    match cli.command {
        Commands::Serve { port, production } => {
            if let Some(port) = port {
                config.port = port;
            }
            if production {
                config.mode = Mode::Production;
            }

            let router = server::create_app(&config, &registry).await?;
            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

            tracing::info!("App is running in {} mode!", config.mode);
            println!("Server running on http://localhost:{}", config.port);
            println!("  API:      http://localhost:{}{}/...", config.port, config.api_prefix);

            axum::serve(listener, router).await?;
        }

        Commands::Routes { production } => {
            if production {
                config.mode = Mode::Production;
            }

            let (table, report) = server::load_routes(&config, &registry).await?;

            if table.bindings().is_empty() {
                println!("No routes found in {}", config.routes_dir().display());
            } else {
                for binding in table.bindings() {
                    println!("{}", binding);
                }
            }

            for path in &report.unrecognized {
                println!("! no handlers: {}", path.display());
            }
            for (path, reason) in &report.failed {
                println!("! failed: {} ({})", path.display(), reason);
            }
        }

        Commands::Build => {
            let written = build::compile_routes(&config, &registry)?;
            println!(
                "✓ Compiled {} route files into {}",
                written.len(),
                config.compiled_path().display()
            );
        }
    }

    Ok(())
}
