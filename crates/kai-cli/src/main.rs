//! Kai CLI - English conversation coach for Chinese and Japanese speakers

use anyhow::Result;
use clap::{Parser, Subcommand};
use kai_core::Config;

mod commands;

use commands::{LearnerArgs, PromptKind};

#[derive(Parser)]
#[command(name = "kai")]
#[command(version)]
#[command(about = "English conversation coach with corrections, hints and vocabulary", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose output (show prompt sizes and debug info)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the detected language and planned tasks for a message
    Plan {
        /// Learner message
        text: String,

        #[command(flatten)]
        learner: LearnerArgs,
    },

    /// Print a rendered prompt without calling the service
    Prompt {
        /// Learner message
        text: String,

        /// Which prompt to render
        #[arg(short, long, value_enum, default_value = "system")]
        kind: PromptKind,

        /// Finished answer, required for the post-process prompt
        #[arg(long)]
        answer: Option<String>,

        #[command(flatten)]
        learner: LearnerArgs,
    },

    /// Single-pass reply with corrections or hints and vocabulary
    Chat {
        /// Learner message
        text: String,

        #[command(flatten)]
        learner: LearnerArgs,

        /// Use canned replies instead of the API
        #[arg(long)]
        mock: bool,
    },

    /// Stream the answer, then add corrections or hints and vocabulary
    Stream {
        /// Learner message
        text: String,

        #[command(flatten)]
        learner: LearnerArgs,

        /// Use canned replies instead of the API
        #[arg(long)]
        mock: bool,
    },

    /// Validate a reply JSON document (use - for stdin)
    Parse {
        /// Path to the reply, or - to read stdin
        path: String,
    },

    /// Estimate pitch, energy and pauses in a WAV recording
    Analyze {
        /// Path to WAV file
        path: String,

        /// Print the full feature set as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show config file path
    Path,

    /// Set the default learner level
    SetLevel {
        /// beginner, elementary, intermediate, upper-intermediate, advanced
        level: String,
    },

    /// Set the default reply language
    SetTarget {
        /// en or ja
        language: String,
    },

    /// Set the chat model
    SetModel {
        /// gpt-4o-mini, gpt-4.1-mini or any model id the endpoint accepts
        model: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for replies
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Plan { text, learner } => {
            let config = Config::load_with_env(config_path)?;
            commands::plan::run(&text, &learner.options(&config))
        }

        Commands::Prompt {
            text,
            kind,
            answer,
            learner,
        } => {
            let config = Config::load_with_env(config_path)?;
            commands::prompt::run(&config, &text, kind, answer.as_deref(), &learner.options(&config))
        }

        Commands::Chat {
            text,
            learner,
            mock,
        } => {
            let config = Config::load_with_env(config_path)?;
            commands::chat::run(&config, &text, &learner.options(&config), mock, cli.verbose).await
        }

        Commands::Stream {
            text,
            learner,
            mock,
        } => {
            let config = Config::load_with_env(config_path)?;
            commands::chat::stream(&config, &text, &learner.options(&config), mock).await
        }

        Commands::Parse { path } => commands::parse::run(&path),

        Commands::Analyze { path, json } => commands::analyze::run(&path, json),

        // Settings are saved from the file alone so environment values never land on disk
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = Config::load_with_env(config_path)?;
                commands::config::show(&config)
            }
            ConfigAction::Path => commands::config::show_path(config_path),
            ConfigAction::SetLevel { level } => {
                let mut config = Config::load(config_path)?;
                commands::config::set_level(&mut config, config_path, &level)
            }
            ConfigAction::SetTarget { language } => {
                let mut config = Config::load(config_path)?;
                commands::config::set_target(&mut config, config_path, &language)
            }
            ConfigAction::SetModel { model } => {
                let mut config = Config::load(config_path)?;
                commands::config::set_model(&mut config, config_path, &model)
            }
        },
    }
}
