use crate::config::types::{CheckerConfig, Config, ExceptionRule};
use crate::ConfigError;
use url::Host;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_checker_config(&config.checker)?;
    validate_exceptions(&config.exceptions)?;
    Ok(())
}

/// Validates crawl engine configuration
fn validate_checker_config(config: &CheckerConfig) -> Result<(), ConfigError> {
    if !config.max_rate.is_finite() || config.max_rate <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "max_rate must be a positive number, got {}",
            config.max_rate
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the per-host exception table
fn validate_exceptions(rules: &[ExceptionRule]) -> Result<(), ConfigError> {
    for (index, rule) in rules.iter().enumerate() {
        if rule.hosts.is_empty() {
            return Err(ConfigError::Validation(format!(
                "exception #{} must list at least one host",
                index + 1
            )));
        }

        for host in &rule.hosts {
            validate_host_pattern(host)?;
        }

        if rule.statuses.is_empty() {
            return Err(ConfigError::Validation(format!(
                "exception #{} must list at least one status",
                index + 1
            )));
        }

        if let Some(status) = rule.statuses.iter().find(|s| !(100..=999).contains(*s)) {
            return Err(ConfigError::Validation(format!(
                "exception #{} has invalid status code {}",
                index + 1,
                status
            )));
        }

        if rule.message.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "exception #{} must have a message",
                index + 1
            )));
        }
    }

    Ok(())
}

/// Validates a host pattern (supports a leading `*.` wildcard)
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(host) => validate_host_string(host),
        None => validate_host_string(pattern),
    }
}

/// Validates a host string (without wildcard prefix)
///
/// Accepts anything the URL parser accepts as a host (domains, single-label
/// hosts such as `localhost`, IP addresses) as long as no label is empty.
fn validate_host_string(host: &str) -> Result<(), ConfigError> {
    let parsed = Host::parse(host).map_err(|e| {
        ConfigError::InvalidPattern(format!("Host '{}' is invalid: {}", host, e))
    })?;

    if let Host::Domain(domain) = &parsed {
        if domain.split('.').any(str::is_empty) {
            return Err(ConfigError::InvalidPattern(format!(
                "Host '{}' has an empty label",
                host
            )));
        }
    }

    Ok(())
}
