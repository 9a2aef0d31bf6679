//! Binary entrypoint for the rpcore CLI.
//!
//! Commands:
//! - `start` - run the server: spawn stored vehicles, start save/decay passes, read commands from stdin
//! - `init` - write a starter `config.toml` and create the data directory
//! - `status` - print store counts and registry summary
//! - `items` - list registered items and jobs
//! - `exec <command...>` - run a single text command against the store and exit
//!
//! See the library crate docs for module-level details: `rpcore::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use rpcore::config::Config;
use rpcore::roleplay::{Actor, RoleplayStore};
use rpcore::server::{RoleplayServer, RpCommand};

#[derive(Parser)]
#[command(name = "rpcore")]
#[command(about = "Roleplay gameplay systems for a multiplayer game server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server and read commands from stdin
    Start,
    /// Write a default configuration file
    Init,
    /// Show store and registry statistics
    Status,
    /// List registered items and jobs
    Items,
    /// Run one command (e.g. `exec addMoney John_Doe 50 cash`)
    Exec {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Start => {
            let config = match pre_config {
                Some(c) => c,
                None => Config::load(&cli.config).await?,
            };
            info!("Starting rpcore v{}", env!("CARGO_PKG_VERSION"));
            let mut server = RoleplayServer::new(config).await?;
            server.run().await?;
        }
        Commands::Init => {
            info!("Initializing new configuration");
            Config::create_default(&cli.config).await?;
            let cfg = Config::default();
            tokio::fs::create_dir_all(&cfg.storage.data_dir).await?;
            RoleplayStore::open(&cfg.storage.data_dir)?;
            info!(
                "Configuration file created at {}; data directory {}",
                cli.config, cfg.storage.data_dir
            );
        }
        Commands::Status => {
            let config = match pre_config {
                Some(c) => c,
                None => Config::load(&cli.config).await?,
            };
            let server = RoleplayServer::new(config).await?;
            server.show_status()?;
        }
        Commands::Items => {
            let config = pre_config.unwrap_or_default();
            let server = RoleplayServer::new(config).await?;
            for cmd in [RpCommand::Items, RpCommand::Jobs] {
                println!("{}", server.processor().execute(&Actor::console(), cmd).await);
            }
        }
        Commands::Exec { line } => {
            let config = match pre_config {
                Some(c) => c,
                None => Config::load(&cli.config).await?,
            };
            let server = RoleplayServer::new(config).await?;
            let reply = server
                .processor()
                .process(&Actor::console(), &line.join(" "))
                .await;
            println!("{}", reply);
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    match log_file {
        Some(f) => {
            let file = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Echo to the console only when attached to a terminal
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = file.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
