//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::api::ApiClient;
use crate::cli::OutputFormat;
use crate::core::{Config, SessionContext, SessionStore};
use crate::entities::image::FileRejection;
use crate::schema::validator::ValidationErrors;
use crate::wizard::step::WizardStep;

/// Client for the configured backend with the stored session
pub fn connect(config: &Config) -> Result<ApiClient> {
    let session = SessionContext::load(SessionStore::default_location());
    Ok(ApiClient::new(config, session)?)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a serializable value as JSON or YAML. Returns false for other formats.
pub fn print_structured<T: Serialize + ?Sized>(format: OutputFormat, value: &T) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Print the errors of one step, one field path per line
pub fn print_step_errors(step: WizardStep, errors: &ValidationErrors) {
    println!(
        "  {} {} ({} problem(s))",
        style("✗").red(),
        style(step.title()).bold(),
        errors.len()
    );
    for (path, message) in errors.iter() {
        println!("    {} {}", style(path).cyan(), message);
    }
}

pub fn print_rejections(rejections: &[FileRejection]) {
    for rejection in rejections {
        println!("  {} {}", style("!").yellow(), rejection.message);
    }
}
