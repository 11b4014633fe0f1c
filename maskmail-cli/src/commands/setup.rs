// maskmail-cli/src/commands/setup.rs
use crate::output::ExitCode;
use anyhow::Result;
use dialoguer::Password;
use maskmail_client::{Config, MaskmailClient};

/// Run the interactive setup command
pub async fn run_setup(config: Config) -> Result<ExitCode> {
    println!("maskmail setup");
    println!();

    // Prompt for API token
    let token = Password::new()
        .with_prompt("Enter your Fastmail API token")
        .interact()?;

    if token.is_empty() {
        eprintln!("Error: API token cannot be empty");
        return Ok(ExitCode::PermanentError);
    }

    println!();
    println!("Validating credentials...");

    // Validate token by resolving a session with it
    match MaskmailClient::connect_to(token.clone(), &config.session_url, config.timeout()).await {
        Ok(client) => {
            if let Err(e) = Config::save_token(&token) {
                eprintln!("Error: Couldn't write config file: {:#}", e);
                return Ok(ExitCode::PermanentError);
            }

            println!("Credentials saved for {}!", client.session().username);
            println!();
            println!("Try: maskmail show");

            Ok(ExitCode::Success)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Visit https://app.fastmail.com/settings/security/integrations");
            eprintln!("to create an API token with the Masked Email scope.");
            Ok(if e.is_timeout() || e.is_transport() {
                ExitCode::TransientError
            } else {
                ExitCode::PermanentError
            })
        }
    }
}
