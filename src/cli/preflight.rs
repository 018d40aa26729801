//! Pre-flight checks before remote operations.
//!
//! Validates that the credential and endpoint are configured before any
//! document is read or any request is sent.

use crate::agent::{validate_api_key, validate_base_url};
use crate::config::Settings;
use crate::error::Result;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Text extraction is purely local.
    Extract,
    /// Summary and quiz generation need the model endpoint.
    Generate,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Extract => {}
        Operation::Generate => {
            let env_var = &settings.model.api_key_env;
            validate_api_key(env_var, std::env::var(env_var).ok())?;
            validate_base_url(&settings.model.base_url)?;
        }
    }
    Ok(())
}
