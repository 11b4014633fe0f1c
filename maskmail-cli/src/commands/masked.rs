// maskmail-cli/src/commands/masked.rs
use crate::output::{
    print_failure, print_output, print_success, Address, ErrorResponse, ExitCode,
    MaskedEmailTable, OutputFormat, Response,
};
use anyhow::Result;
use maskmail_client::{Change, MaskedEmailState, MaskmailClient, PartialMaskedEmail};

/// Masked email operations, already validated by the argument parser
#[derive(Debug, Clone)]
pub enum MaskedCommand {
    Create {
        domain: String,
        description: String,
        prefix: Option<String>,
        state: MaskedEmailState,
    },
    Show {
        state: Option<MaskedEmailState>,
    },
    SetState {
        id: String,
        state: MaskedEmailState,
    },
    Destroy {
        id: String,
    },
}

pub async fn handle(
    client: &MaskmailClient,
    cmd: MaskedCommand,
    format: OutputFormat,
) -> Result<ExitCode> {
    match cmd {
        MaskedCommand::Create {
            domain,
            description,
            prefix,
            state,
        } => {
            let mut create = PartialMaskedEmail::new()
                .state(state)
                .for_domain(domain)
                .description(description);
            if let Some(prefix) = prefix {
                create = create.email_prefix(prefix);
            }

            match client.create(create).await? {
                Change::Applied(created) => {
                    print_output(&Address(&created), format);
                    Ok(ExitCode::Success)
                }
                Change::Rejected(err) => Ok(print_failure(
                    ErrorResponse::not_applied("created", Some(&err)),
                    format,
                )),
                Change::NotReported => Ok(print_failure(
                    ErrorResponse::not_applied("created", None),
                    format,
                )),
            }
        }
        MaskedCommand::Show { state } => {
            let list = client.list(state).await?;
            print_output(&MaskedEmailTable(&list), format);
            Ok(ExitCode::Success)
        }
        MaskedCommand::SetState { id, state } => {
            let Some(target) = client.find(&id).await? else {
                return Ok(not_found(&id, format));
            };

            let (action, past) = match state {
                MaskedEmailState::Enabled => ("enable", "enabled"),
                MaskedEmailState::Disabled => ("disable", "disabled"),
                MaskedEmailState::Deleted => ("delete", "deleted"),
                MaskedEmailState::Pending => ("reset", "reset"),
            };

            match client.set_state(&target.id, state).await? {
                Change::Applied(_) => {
                    report_done(action, &target.id.to_string(), &target.email, format)?;
                    Ok(ExitCode::Success)
                }
                Change::Rejected(err) => Ok(print_failure(
                    ErrorResponse::not_applied(past, Some(&err)),
                    format,
                )),
                Change::NotReported => Ok(print_failure(
                    ErrorResponse::not_applied(past, None),
                    format,
                )),
            }
        }
        MaskedCommand::Destroy { id } => {
            let Some(target) = client.find(&id).await? else {
                return Ok(not_found(&id, format));
            };

            match client.destroy(&target.id).await? {
                Change::Applied(()) => {
                    report_done("destroy", &target.id.to_string(), &target.email, format)?;
                    Ok(ExitCode::Success)
                }
                Change::Rejected(err) => Ok(print_failure(
                    ErrorResponse::not_applied("destroyed", Some(&err)),
                    format,
                )),
                Change::NotReported => Ok(print_failure(
                    ErrorResponse::not_applied("destroyed", None),
                    format,
                )),
            }
        }
    }
}

fn not_found(id: &str, format: OutputFormat) -> ExitCode {
    print_failure(
        ErrorResponse::not_found(format!("Masked email not found: {}", id)),
        format,
    )
}

fn report_done(action: &str, id: &str, email: &str, format: OutputFormat) -> Result<()> {
    match format.resolve() {
        OutputFormat::Json => {
            let resp = Response::ok(serde_json::json!({
                "id": id,
                "email": email,
                "action": action,
            }));
            println!("{}", serde_json::to_string(&resp)?);
        }
        _ => print_success(&format!("{}: {}", capitalize(action), email)),
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
