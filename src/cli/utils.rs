use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::cli::{OutputFormat, Reported};
use crate::error::ApiError;
use crate::types::User;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error in the appropriate format. Field errors from the backend
/// are listed individually in JSON output.
pub fn output_api_error(output_format: &OutputFormat, error: &ApiError) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": error.to_string(),
                "error_code": error.error_code()
            });

            if let ApiError::BackendValidation { message, field_errors } = error {
                response["message"] = json!(message);
                let fields: serde_json::Map<String, Value> = field_errors
                    .iter()
                    .map(|(field, text)| (field.clone(), json!(text)))
                    .collect();
                response["field_errors"] = Value::Object(fields);
            }
            if let Some(status) = error.status_code() {
                response["status"] = json!(status);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", error);
        }
    }
    Ok(())
}

/// Show `error` and hand back a marker so the binary only sets the exit code
pub fn report(output_format: &OutputFormat, error: ApiError) -> anyhow::Error {
    if let Err(e) = output_api_error(output_format, &error) {
        tracing::debug!("failed to print error: {}", e);
    }
    Reported(error).into()
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

pub fn output_users(output_format: &OutputFormat, users: &[User]) -> anyhow::Result<()> {
    if users.is_empty() {
        return output_empty_collection(output_format, "users", "No users found");
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "users": users }))?);
        }
        OutputFormat::Text => {
            println!("{:<8} {:<25} {}", "ID", "NAME", "EMAIL");
            println!("{}", "-".repeat(60));
            for user in users {
                println!("{:<8} {:<25} {}", user.id, user.name, user.email);
            }
        }
    }
    Ok(())
}

/// Read one line from stdin after printing `label` to stderr
pub fn prompt_line(label: &str) -> anyhow::Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        anyhow::bail!("No input for {}", label);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Use the provided value or ask for it
pub fn value_or_prompt(provided: Option<String>, label: &str) -> anyhow::Result<String> {
    match provided {
        Some(value) => Ok(value),
        None => prompt_line(label),
    }
}

pub fn prompt_confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt_line(&format!("{} [y/N]", question))?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
