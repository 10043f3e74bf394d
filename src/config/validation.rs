use crate::config::types::{
    Config, CrawlerConfig, ExtractorConfig, FilterCategory, FrontierConfig, OutputConfig,
};
use crate::url::{is_valid_url, site_of_url};
use crate::ConfigError;

/// Upper bound on parallel workers; the dataset lock serializes writes, so more
/// workers than this only add contention.
const MAX_THREADS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_frontier_config(&config.frontier)?;
    validate_output_config(&config.output)?;
    validate_extractor_config(&config.extractor)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if !is_valid_url(&config.start_url) {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url must be an absolute http(s) URL, got '{}'",
            config.start_url
        )));
    }

    site_of_url(&config.start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("start_url: {}", e)))?;

    if config.number_of_threads < 1 || config.number_of_threads > MAX_THREADS {
        return Err(ConfigError::Validation(format!(
            "number_of_threads must be between 1 and {}, got {}",
            MAX_THREADS, config.number_of_threads
        )));
    }

    if config.queue_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "queue_capacity must be >= 1, got {}",
            config.queue_capacity
        )));
    }

    if config.poll_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= 10ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    if config.excluded_suffixes.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::Validation(
            "excluded_suffixes cannot contain an empty suffix".to_string(),
        ));
    }

    Ok(())
}

/// Validates frontier configuration
fn validate_frontier_config(config: &FrontierConfig) -> Result<(), ConfigError> {
    if config.database_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "frontier database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "data_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates extractor configuration
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "extractor timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    for filter in &config.filters {
        validate_filter_category(filter)?;
    }

    Ok(())
}

/// Validates a single keyword category
fn validate_filter_category(filter: &FilterCategory) -> Result<(), ConfigError> {
    if filter.category.trim().is_empty() {
        return Err(ConfigError::InvalidFilter(
            "filter category cannot be empty".to_string(),
        ));
    }

    if filter.category == "all" {
        return Err(ConfigError::InvalidFilter(
            "'all' is reserved and cannot be used as a category".to_string(),
        ));
    }

    if filter.keywords.is_empty() || filter.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::InvalidFilter(format!(
            "Filter category '{}' needs at least one non-empty keyword",
            filter.category
        )));
    }

    Ok(())
}
