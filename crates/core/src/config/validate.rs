use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Dedup table names are distinct plain SQL identifiers
/// - Size ceiling is positive
/// - At least one good-quality tag is configured
/// - Concurrency, page size and retry attempts are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let db = &config.database;
    for name in [&db.good_quality_table, &db.bad_quality_table] {
        if !is_plain_identifier(name) {
            return Err(ConfigError::ValidationError(format!(
                "database table name {:?} must be a non-empty identifier ([A-Za-z_][A-Za-z0-9_]*)",
                name
            )));
        }
    }
    if db.good_quality_table == db.bad_quality_table {
        return Err(ConfigError::ValidationError(
            "database.good_quality_table and database.bad_quality_table must differ".to_string(),
        ));
    }

    let max_size = config.matching.max_size_gb;
    if max_size.is_nan() || max_size <= 0.0 {
        return Err(ConfigError::ValidationError(
            "matching.max_size_gb must be positive".to_string(),
        ));
    }

    if config.matching.good_quality.is_empty() {
        return Err(ConfigError::ValidationError(
            "matching.good_quality cannot be empty".to_string(),
        ));
    }

    if config.scheduler.max_concurrent_films == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.max_concurrent_films cannot be 0".to_string(),
        ));
    }

    if config.catalog.max_limit == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.max_limit cannot be 0".to_string(),
        ));
    }

    if config.catalog.retry.attempts == 0 || config.tracker_api.magnet_retry.attempts == 0 {
        return Err(ConfigError::ValidationError(
            "retry attempts cannot be 0".to_string(),
        ));
    }

    if let Some(server) = &config.server {
        if server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}

/// `[A-Za-z_][A-Za-z0-9_]*`, safe to quote into SQL as a table name.
pub(crate) fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
