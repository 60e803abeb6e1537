use std::process::ExitCode;

use projector::config_file::Config;

/// Print the config file schema as pretty JSON.
///
/// # Errors
///
/// Returns an error if the schema cannot be serialized.
pub fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let schema = schemars::schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(ExitCode::SUCCESS)
}
