use std::fs::File;
use std::path::PathBuf;

use aibaby::core::config::{self, CliOverrides};
use aibaby::core::session::SessionStore;
use aibaby::tui;
use clap::Parser;
use log::{info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "aibaby", about = "Terminal client for AI Baby")]
struct Args {
    /// Base URL of the API (e.g. http://localhost:5000/api)
    #[arg(long)]
    api_url: Option<String>,

    /// Where the login session is stored
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// Forget the stored session before starting
    #[arg(long)]
    logout: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to aibaby.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("aibaby.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        warn!("Ignoring config file: {}", e);
        config::AibabyConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            api_url: args.api_url,
            session_file: args.session_file,
        },
    );
    info!("AI Baby starting up against {}", resolved.api_url);

    let store = SessionStore::new(resolved.session_file.clone());
    let mut session = store.load();
    if args.logout {
        info!("Clearing stored session");
        store.clear(&mut session)?;
    }

    tui::run(resolved, store, session)
}
