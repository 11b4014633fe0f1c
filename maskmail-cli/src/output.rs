// maskmail-cli/src/output.rs
use console::{pad_str, style, Alignment};
use maskmail_client::{Error, MaskedEmail, SetError};
use serde::Serialize;
use std::io::IsTerminal;

/// Output format option
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Auto-detect based on TTY
    Auto,
    /// Force JSON output
    Json,
    /// Force human-readable output
    Human,
}

impl OutputFormat {
    /// Resolve `Auto` against the current stdout
    pub fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Human,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format as JSON string
    fn to_json(&self) -> String;

    /// Format as human-readable string
    fn to_human(&self) -> String;
}

/// Format output based on the specified format
pub fn format_output<T: Formattable>(data: &T, format: OutputFormat) -> String {
    match format.resolve() {
        OutputFormat::Json => data.to_json(),
        _ => data.to_human(),
    }
}

/// Standard JSON response envelope
#[derive(Debug, Serialize)]
pub struct Response<T> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorResponse>,
}

impl<T> Response<T> {
    pub fn ok(result: T) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(error: ErrorResponse) -> Response<()> {
        Response::<()> {
            ok: false,
            result: None,
            error: Some(error),
        }
    }
}

fn envelope_json<T: Serialize>(result: &T) -> String {
    serde_json::to_string(&Response::ok(result)).unwrap_or_else(|e| {
        serde_json::json!({"ok": false, "error": {"type": "internal", "message": e.to_string()}})
            .to_string()
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    type_: &'static str,
    message: String,
    retryable: bool,
    #[serde(skip)]
    exit_code: ExitCode,
}

impl ErrorResponse {
    fn new(type_: &'static str, message: String, exit_code: ExitCode) -> Self {
        Self {
            type_,
            message,
            retryable: matches!(exit_code, ExitCode::TransientError),
            exit_code,
        }
    }

    pub fn safety_rejected(message: String) -> Self {
        Self::new("safety_rejected", message, ExitCode::SafetyRejected)
    }

    pub fn not_found(message: String) -> Self {
        Self::new("not_found", message, ExitCode::PermanentError)
    }

    pub fn config(message: String) -> Self {
        Self::new("config", message, ExitCode::PermanentError)
    }

    /// The server accepted the call but did not apply the change
    pub fn not_applied(action: &str, reason: Option<&SetError>) -> Self {
        let message = match reason {
            Some(err) => format!("No address was {}: {}", action, err),
            None => format!("No address was {}", action),
        };
        Self::new("not_applied", message, ExitCode::NotApplied)
    }

    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<Error>() {
            Some(Error::Timeout(_)) => {
                Self::new("timeout", err.to_string(), ExitCode::TransientError)
            }
            Some(Error::Transport { .. }) => {
                Self::new("transport_failed", err.to_string(), ExitCode::TransientError)
            }
            Some(Error::Validation(_)) => {
                Self::new("validation_failed", err.to_string(), ExitCode::PermanentError)
            }
            Some(Error::Method(method)) if method.is_retryable() => {
                Self::new("method_error", err.to_string(), ExitCode::TransientError)
            }
            Some(Error::Method(_)) => {
                Self::new("method_error", err.to_string(), ExitCode::PermanentError)
            }
            None => Self::new("error", format!("{:#}", err), ExitCode::PermanentError),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }
}

/// Exit codes for agent decision making
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    TransientError = 1,
    PermanentError = 2,
    SafetyRejected = 3,
    NotApplied = 4,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Print data to stdout in the requested format
pub fn print_output<T: Formattable>(data: &T, format: OutputFormat) {
    println!("{}", format_output(data, format));
}

/// Print an error and return its exit code
///
/// JSON errors go to stdout so callers parsing the envelope see them.
pub fn print_failure(error: ErrorResponse, format: OutputFormat) -> ExitCode {
    let code = error.exit_code();
    match format.resolve() {
        OutputFormat::Json => match serde_json::to_string(&Response::<()>::error(error)) {
            Ok(json) => println!("{}", json),
            Err(e) => print_error(&e.to_string()),
        },
        _ => print_error(&error.message),
    }
    code
}

/// Print a styled success message
pub fn print_success(message: &str) {
    let term = console::Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("✓").green(), message));
}

/// Print a styled error message
pub fn print_error(message: &str) {
    let term = console::Term::stderr();
    let _ = term.write_line(&format!("{} {}", style("Error:").red(), message));
}

/// A single masked email; human form is just the address
pub struct Address<'a>(pub &'a MaskedEmail);

impl Formattable for Address<'_> {
    fn to_json(&self) -> String {
        envelope_json(self.0)
    }

    fn to_human(&self) -> String {
        self.0.email.clone()
    }
}

/// Masked emails rendered as a right-aligned table
pub struct MaskedEmailTable<'a>(pub &'a [MaskedEmail]);

const TABLE_HEADERS: [&str; 4] = ["Email", "State", "Domain", "Description"];

impl MaskedEmailTable<'_> {
    fn rows(&self) -> Vec<[String; 4]> {
        self.0
            .iter()
            .map(|m| {
                [
                    m.email.clone(),
                    m.state.map(|s| s.to_string()).unwrap_or_default(),
                    m.for_domain.clone().unwrap_or_default(),
                    m.description.clone().unwrap_or_default(),
                ]
            })
            .collect()
    }
}

impl Formattable for MaskedEmailTable<'_> {
    fn to_json(&self) -> String {
        envelope_json(&self.0)
    }

    fn to_human(&self) -> String {
        let rows = self.rows();
        let mut widths = TABLE_HEADERS.map(console::measure_text_width);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(console::measure_text_width(cell));
            }
        }

        let border = widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+");
        let border = format!("+{}+", border);

        let line = |cells: [&str; 4]| {
            let padded = cells
                .iter()
                .zip(widths)
                .map(|(cell, w)| format!(" {} ", pad_str(cell, w, Alignment::Right, None)))
                .collect::<Vec<_>>()
                .join("|");
            format!("|{}|", padded)
        };

        let mut out = vec![border.clone(), line(TABLE_HEADERS), border.clone()];
        for row in &rows {
            out.push(line([
                row[0].as_str(),
                row[1].as_str(),
                row[2].as_str(),
                row[3].as_str(),
            ]));
        }
        out.push(border);
        out.join("\n")
    }
}
