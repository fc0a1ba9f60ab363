//! `prefs` - command-line host for one settings form session

use clap::{Parser, Subcommand, ValueEnum};
use prefs_core::PasswordPolicy;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod config;
mod session;

use config::AppConfig;
use session::{run_session, SessionPlan};

#[derive(Parser, Debug)]
#[command(name = "prefs", version, about = "Update a password and compliance settings")]
struct Cli {
    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a password against the strength policy
    CheckPassword {
        password: String,
        #[arg(long, value_enum, default_value_t = PolicyArg::WithSymbols)]
        policy: PolicyArg,
    },
    /// Run one form session and submit it
    Submit {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
        /// Enable compliance settings
        #[arg(long, default_value_t = false)]
        gdpr: bool,
        #[arg(long)]
        company_name: Option<String>,
        #[arg(long)]
        company_email: Option<String>,
        #[arg(long)]
        company_location: Option<String>,
        /// Seconds spent focused before submitting
        #[arg(long, default_value_t = 0)]
        dwell_secs: u64,
        /// Seconds spent unfocused before submitting
        #[arg(long, default_value_t = 0)]
        unfocused_secs: u64,
    },
    /// Print the effective configuration
    ShowConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Alphanumeric,
    WithSymbols,
}

impl From<PolicyArg> for PasswordPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Alphanumeric => PasswordPolicy::Alphanumeric,
            PolicyArg::WithSymbols => PasswordPolicy::WithSymbols,
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<bool> {
    match command {
        Commands::CheckPassword { password, policy } => {
            let policy = PasswordPolicy::from(policy);
            let strong = policy.is_strong(&password);
            if strong {
                println!("strong");
            } else {
                println!("weak: {}", policy.requirements());
            }
            Ok(strong)
        }
        Commands::Submit {
            config,
            password,
            confirm,
            gdpr,
            company_name,
            company_email,
            company_location,
            dwell_secs,
            unfocused_secs,
        } => {
            let config = AppConfig::load(config.as_deref())?;
            let plan = SessionPlan {
                password,
                confirm,
                gdpr,
                company_name,
                company_email,
                company_location,
                dwell_secs,
                unfocused_secs,
            };
            run_session(config, plan).await
        }
        Commands::ShowConfig { config } => {
            let config = AppConfig::load(config.as_deref())?;
            print!("{}", config.to_toml()?);
            Ok(true)
        }
    }
}
