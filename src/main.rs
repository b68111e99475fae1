//! CLI entry point for pressroll

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pressroll::{commands, server, Site};

#[derive(Parser)]
#[command(name = "pressroll")]
#[command(version)]
#[command(about = "A static content pipeline for MDX blogs and podcast sites", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new document
    New {
        /// Title of the new document
        title: String,

        /// Document type (defaults to the home type)
        #[arg(short, long = "type")]
        doc_type: Option<String>,
    },

    /// Load all content and generate the static site
    #[command(alias = "b")]
    Build {
        /// Rebuild on file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a preview server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Disable content reloading on file changes
        #[arg(long)]
        r#static: bool,
    },

    /// List documents of a type in listing order
    List {
        /// Document type (defaults to every type)
        #[arg(short, long = "type")]
        doc_type: Option<String>,
    },

    /// Print every static path
    Routes,

    /// Load content and report errors without writing anything
    Check,

    /// Remove the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "pressroll=debug,info"
    } else {
        "pressroll=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot read the current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New { title, doc_type } => {
            let site = Site::new(&base_dir)?;
            commands::new::create_document(&site, &title, doc_type.as_deref())?;
        }

        Commands::Build { watch } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Building site...");
            commands::build::run(&site)?;
            println!("Built successfully!");

            if watch {
                tokio::task::spawn_blocking(move || commands::build::watch(&site)).await??;
            }
        }

        Commands::Serve {
            port,
            ip,
            open,
            r#static,
        } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            server::start(&site, &ip, port, !r#static, open).await?;
        }

        Commands::List { doc_type } => {
            let site = Site::new(&base_dir)?;
            commands::list::run(&site, doc_type.as_deref())?;
        }

        Commands::Routes => {
            let site = Site::new(&base_dir)?;
            commands::routes::run(&site)?;
        }

        Commands::Check => {
            let site = Site::new(&base_dir)?;
            commands::check::run(&site)?;
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            commands::clean::run(&site)?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("pressroll version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
