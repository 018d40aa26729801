//! Doctor command - verify configuration and the model credential.

use crate::agent::{validate_api_key, validate_base_url};
use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Study Notes Doctor");
    println!();
    println!("Checking configuration...\n");

    let mut checks = Vec::new();

    let model_checks = vec![
        check_api_key(
            &settings.model.api_key_env,
            std::env::var(&settings.model.api_key_env).ok(),
        ),
        check_base_url(&settings.model.base_url),
        check_model(&settings.model.model),
    ];
    print_section("Model Endpoint", &model_checks);
    checks.extend(model_checks);

    let path_checks = vec![
        check_config_file(&Settings::default_config_path()),
        check_prompts_dir(settings.prompts.custom_dir.as_deref()),
    ];
    print_section("Files", &path_checks);
    checks.extend(path_checks);

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before generating summaries or quizzes.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Ready to summarize.");
    }

    Ok(())
}

/// Show only the edges of a credential.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check_api_key(env_var: &str, value: Option<String>) -> CheckResult {
    match validate_api_key(env_var, value) {
        Ok(key) => CheckResult::ok(env_var, &format!("configured ({})", mask_key(&key))),
        Err(e) => CheckResult::error(
            env_var,
            &e.to_string(),
            &format!("Set with: export {}='...' or add it to a .env file", env_var),
        ),
    }
}

fn check_base_url(raw: &str) -> CheckResult {
    match validate_base_url(raw) {
        Ok(url) => CheckResult::ok("Base URL", &url),
        Err(e) => CheckResult::error(
            "Base URL",
            &e.to_string(),
            "Set model.base_url in the config file",
        ),
    }
}

fn check_model(model: &str) -> CheckResult {
    if model.trim().is_empty() {
        CheckResult::error("Model", "empty", "Set model.model in the config file")
    } else {
        CheckResult::ok("Model", model)
    }
}

fn check_config_file(path: &Path) -> CheckResult {
    if path.exists() {
        CheckResult::ok("Config file", &format!("{}", path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: studynotes config init",
        )
    }
}

fn check_prompts_dir(custom_dir: Option<&str>) -> CheckResult {
    let Some(dir) = custom_dir else {
        return CheckResult::ok("Prompts", "built-in templates");
    };
    let file = Settings::expand_path(dir).join("prompts.toml");
    if file.exists() {
        CheckResult::ok("Prompts", &format!("{}", file.display()))
    } else {
        CheckResult::warning(
            "Prompts",
            &format!("{} not found, using built-in templates", file.display()),
            "Create prompts.toml in prompts.custom_dir or unset it",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("AIzaSyExampleKey1234"), "AIza...1234");
        assert_eq!(mask_key("short"), "*****");
    }

    #[test]
    fn test_check_api_key() {
        let ok = check_api_key("GEMINI_API_KEY", Some("AIzaSyExampleKey1234".to_string()));
        assert_eq!(ok.status, CheckStatus::Ok);
        assert!(!ok.message.contains("Example"));

        let missing = check_api_key("GEMINI_API_KEY", None);
        assert_eq!(missing.status, CheckStatus::Error);
        assert!(missing.message.contains("not set"));
    }

    #[test]
    fn test_check_base_url() {
        assert_eq!(
            check_base_url("https://generativelanguage.googleapis.com/v1beta/openai/").status,
            CheckStatus::Ok
        );
        assert_eq!(check_base_url("ftp://example.com").status, CheckStatus::Error);
    }

    #[test]
    fn test_check_prompts_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_prompts_dir(dir.path().to_str());
        assert_eq!(result.status, CheckStatus::Warning);
        assert_eq!(check_prompts_dir(None).status, CheckStatus::Ok);
    }
}
