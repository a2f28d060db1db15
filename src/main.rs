//! CLI entry point for quill

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quill")]
#[command(version)]
#[command(about = "Render Markdown content through templates into a static site", long_about = None)]
struct Cli {
    /// Set the site directory (defaults to current directory)
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
    /// Create config, templates and a sample post
    Init {
        /// Directory to initialize (defaults to the site directory)
        folder: Option<PathBuf>,
    },

    /// Build all content into the output directory
    #[command(alias = "r")]
    Render {
        /// List drafts in site.pages as well
        #[arg(long)]
        drafts_in_index: bool,

        /// Re-render when content, templates or config change
        #[arg(short, long)]
        watch: bool,
    },

    /// Serve the output directory over HTTP
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (default from config, else 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (default from config, else localhost)
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// Remove the output directory
    Clean,

    /// List documents and the templates they use
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "quill=debug,tower_http=debug,info"
    } else {
        "quill=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = match folder {
                Some(folder) if folder.is_absolute() => folder,
                Some(folder) => base_dir.join(folder),
                None => base_dir,
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            quill::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::Render {
            drafts_in_index,
            watch,
        } => {
            let mut site = quill::Site::new(&base_dir)?;
            if drafts_in_index {
                site.config.index_drafts = true;
            }

            let report = site.render()?;
            quill::commands::render::print_report(&report);

            if watch {
                quill::commands::render::watch(&site, drafts_in_index).await?;
            } else if !report.is_success() {
                std::process::exit(1);
            } else {
                println!("Rendered successfully!");
            }
        }

        Commands::Serve { port, ip } => {
            let site = quill::Site::new(&base_dir)?;
            let port = port.unwrap_or(site.config.serve.port);
            let ip = ip.unwrap_or_else(|| site.config.serve.host.clone());

            tracing::info!("Serving {:?} at http://{}:{}/", site.public_dir, ip, port);
            quill::server::start(&site, &ip, port).await?;
        }

        Commands::Clean => {
            let site = quill::Site::new(&base_dir)?;
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List => {
            let site = quill::Site::new(&base_dir)?;
            quill::commands::list::run(&site)?;
        }
    }

    Ok(())
}
