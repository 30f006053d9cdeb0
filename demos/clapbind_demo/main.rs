//! # clapbind demo application
//!
//! A sample CLI tool that showcases how to integrate
//! [clapbind](https://docs.rs/clapbind) into a real application. This is
//! **not** a real app; it exists to demonstrate and manually verify
//! clapbind's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example clapbind_demo -- greet
//! cargo run --example clapbind_demo -- gen-config --format toml
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                  | How to exercise it                                                        |
//! |--------------------------|---------------------------------------------------------------------------|
//! | Flag defaults            | `cargo run --example clapbind_demo -- greet`                              |
//! | Config file (cwd)        | Create `.clapbind-demo.yaml` in cwd, then run `greet`                     |
//! | Config file (XDG/home)   | `~/.config/clapbind-demo/config.yaml` or `~/.clapbind-demo.toml`          |
//! | Explicit config file     | `cargo run --example clapbind_demo -- --config ./demo.json greet`         |
//! | Override section         | Put `greet: {name: you}` in the config file, then run `greet`             |
//! | Env var override         | `CLAPBIND_DEMO__NAME=env cargo run --example clapbind_demo -- greet`      |
//! | Explicit flag            | `cargo run --example clapbind_demo -- greet --name flag`                  |
//! | Verbosity                | `cargo run --example clapbind_demo -- -vvv serve` (debug dump on stderr)  |
//! | Quiet                    | `cargo run --example clapbind_demo -- -q serve`                           |
//! | Starter config           | `cargo run --example clapbind_demo -- gen-config -f json -o demo.json`    |

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing::{debug, info, warn};

use clapbind::{
    Clapbind, ConfigStore, GenConfigArgs, RootFlags, SetupPipeline, VerbosityOptions,
    command_info, debug_dump, invoked_path, level_filter, verbosity_level,
};

// ---------------------------------------------------------------------------
// CLI definitions
// ---------------------------------------------------------------------------

/// clapbind demo: a sample CLI app for showcasing clapbind integration.
///
/// `--config`, `--no-color`, `--verbose` and `--quiet` are added at runtime
/// by [`RootFlags`].
#[derive(Parser, Debug)]
#[command(name = "clapbind-demo", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a greeting.
    Greet {
        /// Who to greet.
        #[arg(long, default_value = "world")]
        name: String,

        /// The greeting word.
        #[arg(long, default_value = "Hello")]
        greeting: String,
    },
    /// Pretend to start a server.
    Serve {
        /// Address to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on.
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print a starter config file built from every flag.
    GenConfig(GenConfigArgs),
}

// ---------------------------------------------------------------------------
// Setup stages
// ---------------------------------------------------------------------------

/// Root stage installs logging from the resolved verbosity; `serve` checks
/// its port before dispatch.
fn setup_pipeline() -> SetupPipeline {
    SetupPipeline::new()
        .stage(&[], |store| {
            let severity = verbosity_level(store, &VerbosityOptions::default());
            tracing_subscriber::fmt()
                .with_max_level(level_filter(severity))
                .with_writer(std::io::stderr)
                .try_init()?;
            if let Some(path) = store.config_file_used() {
                info!("using config file: {}", path.display());
            }
            debug!("{}", debug_dump(store));
            Ok(())
        })
        .stage(&["serve"], |store| {
            let port = store.get_i64("port").unwrap_or(8080);
            if !(1..=65535).contains(&port) {
                return Err(format!("port {port} is out of range").into());
            }
            if port < 1024 {
                warn!(port, "binding a privileged port");
            }
            Ok(())
        })
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn greet(store: &ConfigStore) {
    let greeting = store.get_str("greeting").unwrap_or("Hello");
    let name = store.get_str("name").unwrap_or("world");
    if store.get_bool("no-color").unwrap_or(false) {
        println!("{greeting}, {name}!");
    } else {
        println!("\x1b[33m{greeting}\x1b[0m, {name}!");
    }
}

fn serve(store: &ConfigStore) {
    let host = store.get_str("host").unwrap_or("127.0.0.1");
    let port = store.get_i64("port").unwrap_or(8080);
    info!(host, port, "server would start here");
    println!("listening on {host}:{port} (not really)");
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let cmd = RootFlags::default().apply(Cli::command());
    let matches = cmd.clone().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let path = invoked_path(&matches);
    let path: Vec<&str> = path.iter().map(String::as_str).collect();
    let info = command_info(&cmd, Some(&matches));

    let builder = Clapbind::builder().root_name("clapbind-demo");
    let mut store = ConfigStore::new();
    builder.bind(&mut store, &info, &path).unwrap_or_else(|e| {
        eprintln!("Failed to load config:\n{e}");
        std::process::exit(1);
    });

    setup_pipeline()
        .run(&path, &mut store)
        .unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        });

    match cli.command {
        Commands::Greet { .. } => greet(&store),
        Commands::Serve { .. } => serve(&store),
        Commands::GenConfig(args) => {
            builder
                .handle_and_print(&args.into_action(), &info)
                .unwrap_or_else(|e| {
                    eprintln!("Config error:\n{e}");
                    std::process::exit(1);
                });
        }
    }
}
