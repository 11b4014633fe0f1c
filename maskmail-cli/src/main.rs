mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::masked::{self, MaskedCommand};
use maskmail_client::{Config, MaskedEmailState, Overrides};
use output::{print_failure, ErrorResponse, ExitCode, OutputFormat};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "maskmail")]
#[command(about = "Manage Fastmail masked email addresses", long_about = None)]
struct Cli {
    /// Fastmail API token with Masked Email capabilities.
    /// The MASKMAIL_API_TOKEN environment variable should be preferred.
    #[arg(long, global = true)]
    api_token: Option<String>,
    /// Timeout for the API calls in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// Output format
    #[arg(long, value_enum, default_value = "auto", global = true)]
    format: OutputFormat,
    /// Shorthand for --format json
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a masked email
    Create {
        /// Domain this masked email is for, e.g. https://www.example.com
        #[arg(long)]
        domain: String,
        /// Description of the masked email's usage
        #[arg(long)]
        description: String,
        /// Email prefix
        #[arg(short, long)]
        prefix: Option<String>,
        /// Initial state
        #[arg(long, default_value = "pending", value_parser = parse_state)]
        state: MaskedEmailState,
    },
    /// List masked emails
    Show {
        /// Only list masked emails in this state
        #[arg(long, value_parser = parse_state)]
        state: Option<MaskedEmailState>,
    },
    /// Enable a masked email
    Enable {
        /// Masked email ID or email address
        id: String,
    },
    /// Disable a masked email
    Disable {
        /// Masked email ID or email address
        id: String,
    },
    /// Delete a masked email
    Delete {
        /// Masked email ID or email address
        id: String,
        /// Confirm destructive operation
        #[arg(long)]
        force: bool,
        /// Destroy the record instead of marking it deleted
        #[arg(long)]
        purge: bool,
    },
    /// Store an API token in the config file
    Setup,
}

fn parse_state(s: &str) -> std::result::Result<MaskedEmailState, String> {
    s.parse().map_err(|e: maskmail_client::Error| e.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        cli.format
    };

    let code = match run(cli, format).await {
        Ok(code) => code,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            print_failure(ErrorResponse::from_error(&err), format)
        }
    };

    if code != ExitCode::Success {
        std::process::exit(code.code());
    }
    Ok(())
}

async fn run(cli: Cli, format: OutputFormat) -> Result<ExitCode> {
    let config = Config::load(&Overrides {
        token: cli.api_token,
        timeout_secs: cli.timeout,
    })?;

    let command = match cli.command {
        Commands::Setup => return commands::setup::run_setup(config).await,
        Commands::Create {
            domain,
            description,
            prefix,
            state,
        } => MaskedCommand::Create {
            domain,
            description,
            prefix,
            state,
        },
        Commands::Show { state } => MaskedCommand::Show { state },
        Commands::Enable { id } => MaskedCommand::SetState {
            id,
            state: MaskedEmailState::Enabled,
        },
        Commands::Disable { id } => MaskedCommand::SetState {
            id,
            state: MaskedEmailState::Disabled,
        },
        Commands::Delete { id, force, purge } => {
            if !force {
                return Ok(print_failure(
                    ErrorResponse::safety_rejected(
                        "--force flag is required for delete operations".to_string(),
                    ),
                    format,
                ));
            }
            if purge {
                MaskedCommand::Destroy { id }
            } else {
                MaskedCommand::SetState {
                    id,
                    state: MaskedEmailState::Deleted,
                }
            }
        }
    };

    let Some(token) = config.token().map(String::from) else {
        return Ok(print_failure(
            ErrorResponse::config(
                "No API token. Pass --api-token, set MASKMAIL_API_TOKEN or run `maskmail setup`"
                    .to_string(),
            ),
            format,
        ));
    };

    let client =
        maskmail_client::MaskmailClient::connect_to(token, &config.session_url, config.timeout())
            .await?;
    masked::handle(&client, command, format).await
}
