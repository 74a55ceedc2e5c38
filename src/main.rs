use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docweave::cli::commands;
use docweave::cli::{GenerateOptions, Output, ScanOptions};

#[derive(Parser)]
#[command(name = "docweave")]
#[command(version, about = "Fills in missing Go doc comments with an LLM")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long,
        short,
        global = true,
        help = "Config file to use instead of the global and project files"
    )]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate doc comments for undocumented Go symbols
    Generate {
        #[arg(default_value = ".", help = "Root of the source tree")]
        root: PathBuf,
        #[arg(long, short, help = "Commit the result on this branch (empty = no commit)")]
        branch: Option<String>,
        #[arg(long, short, help = "Maximum symbols to document (0 = no limit)")]
        limit: Option<usize>,
        #[arg(long = "dry-run", help = "Print a diff instead of writing files")]
        dry_run: bool,
        #[arg(long, help = "Only files matching this glob (repeatable)")]
        include: Vec<String>,
        #[arg(long, help = "Skip files matching this glob (repeatable)")]
        exclude: Vec<String>,
        #[arg(long, help = "Files processed concurrently")]
        file_concurrency: Option<usize>,
        #[arg(long, help = "Symbols generated concurrently within one file")]
        symbol_concurrency: Option<usize>,
        #[arg(long = "override", help = "Regenerate existing doc comments")]
        override_existing: bool,
        #[arg(long, help = "Stop at the first failed symbol")]
        fail_fast: bool,
        #[arg(long, help = "Run deadline in seconds")]
        timeout: Option<u64>,
        #[arg(long, help = "LLM provider (openai, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, help = "API key")]
        api_key: Option<String>,
    },

    /// List undocumented symbols without generating anything
    Scan {
        #[arg(default_value = ".", help = "Root of the source tree")]
        root: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
        #[arg(long, help = "Only files matching this glob (repeatable)")]
        include: Vec<String>,
        #[arg(long, help = "Skip files matching this glob (repeatable)")]
        exclude: Vec<String>,
        #[arg(long = "override", help = "Also list symbols that already have docs")]
        override_existing: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(default_value = ".")]
        root: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path {
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Write a default project configuration
    Init {
        #[arg(default_value = ".")]
        root: PathBuf,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mdocweave encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        eprintln!("\n\x1b[33mPlease report this issue at:\x1b[0m");
        eprintln!("  https://github.com/junyeong-ai/docweave/issues");
        eprintln!();

        // Default hook prints the backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Output::new().error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            root,
            branch,
            limit,
            dry_run,
            include,
            exclude,
            file_concurrency,
            symbol_concurrency,
            override_existing,
            fail_fast,
            timeout,
            provider,
            model,
            api_key,
        } => {
            commands::generate::run(GenerateOptions {
                root,
                config_file: cli.config,
                branch,
                limit,
                dry_run,
                include,
                exclude,
                file_concurrency,
                symbol_concurrency,
                override_existing,
                fail_fast,
                timeout_secs: timeout,
                provider,
                model,
                api_key,
            })?;
        }
        Commands::Scan {
            root,
            format,
            include,
            exclude,
            override_existing,
        } => {
            commands::scan::run(ScanOptions {
                root,
                config_file: cli.config,
                format,
                include,
                exclude,
                override_existing,
            })?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { root, format } => {
                commands::config::show(&root, cli.config.as_deref(), &format)?;
            }
            ConfigAction::Path { root } => {
                commands::config::path(&root)?;
            }
            ConfigAction::Init { root, force } => {
                commands::config::init(&root, force)?;
            }
        },
    }

    Ok(())
}
