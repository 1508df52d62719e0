use crate::config::types::{Config, CrawlConfig, FetchConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the number of seeded listing pages
pub const MAX_DEPTH_LIMIT: u32 = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl scope configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    let root = Url::parse(&config.root)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", config.root, e)))?;

    if root.scheme() != "http" && root.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Root URL '{}' must use HTTP or HTTPS",
            config.root
        )));
    }

    if root.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Root URL '{}' has no host",
            config.root
        )));
    }

    if config.depth_limit > MAX_DEPTH_LIMIT {
        return Err(ConfigError::Validation(format!(
            "depth_limit must be <= {}, got {}",
            MAX_DEPTH_LIMIT, config.depth_limit
        )));
    }

    if let Some(prefix) = &config.confine_prefix {
        if prefix.is_empty() {
            return Err(ConfigError::Validation(
                "confine_prefix cannot be empty when set".to_string(),
            ));
        }
    }

    if config.exclude_prefixes.iter().any(|p| p.is_empty()) {
        // An empty prefix would exclude every URL
        return Err(ConfigError::Validation(
            "exclude_prefixes cannot contain an empty prefix".to_string(),
        ));
    }

    Ok(())
}

/// Validates transport configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens/underscores only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if matches!(config.summary_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_root_url() {
        let mut config = Config::default();
        config.crawl.root = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.crawl.root = "ftp://example.com/list/1".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.crawl.root = "https://example.com/list/1".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_depth_limit() {
        let mut config = Config::default();
        config.crawl.depth_limit = 0;
        assert!(validate(&config).is_ok());

        config.crawl.depth_limit = MAX_DEPTH_LIMIT + 1;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_prefixes() {
        let mut config = Config::default();
        config.crawl.confine_prefix = Some(String::new());
        assert!(validate(&config).is_err());

        config.crawl.confine_prefix = None;
        config.crawl.exclude_prefixes = vec!["http://a.com/x".to_string(), String::new()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_concurrency_bounds() {
        let mut config = Config::default();
        config.fetch.concurrency = 0;
        assert!(validate(&config).is_err());

        config.fetch.concurrency = 101;
        assert!(validate(&config).is_err());

        config.fetch.concurrency = 1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_crawler_name() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "bad name!".to_string();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = String::new();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = "good_name-2".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_output_paths() {
        let mut config = Config::default();
        config.output.csv_path = String::new();
        assert!(validate(&config).is_err());

        config.output.csv_path = "out.csv".to_string();
        config.output.summary_path = Some(String::new());
        assert!(validate(&config).is_err());
    }
}
