use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_SEARCH_URL: &str = "https://www.texasbar.com/AM/Template.cfm?Section=Find_A_Lawyer&Template=/CustomSource/MemberDirectory/Result_form_client.cfm";
pub const DEFAULT_BASE_URL: &str = "https://www.texasbar.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default; the lookup only overrides. Kept separate from
/// the process environment so tests can drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = or_default("DATABASE_URL", "sqlite://bardir.db?mode=rwc");
    let log_level = or_default("BARDIR_LOG_LEVEL", "info");
    let search_url = or_default("BARDIR_SEARCH_URL", DEFAULT_SEARCH_URL);
    let base_url = or_default("BARDIR_BASE_URL", DEFAULT_BASE_URL);
    let jurisdiction = or_default("BARDIR_JURISDICTION", "Dallas");

    let page_size = parse_u32("BARDIR_PAGE_SIZE", "200")?;
    if page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BARDIR_PAGE_SIZE".to_string(),
            reason: "page size must be at least 1".to_string(),
        });
    }

    let throttle_every = parse_usize("BARDIR_THROTTLE_EVERY", "25")?;
    let throttle_pause_secs = parse_u64("BARDIR_THROTTLE_PAUSE_SECS", "3")?;
    let db_max_connections = parse_u32("BARDIR_DB_MAX_CONNECTIONS", "1")?;

    let scraper_request_timeout_secs = parse_u64("BARDIR_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "BARDIR_SCRAPER_USER_AGENT",
        "bardir/0.1 (directory-collection)",
    );
    let scraper_max_retries = parse_u32("BARDIR_SCRAPER_MAX_RETRIES", "5")?;
    let scraper_retry_backoff_base_ms =
        parse_u64("BARDIR_SCRAPER_RETRY_BACKOFF_BASE_MS", "5000")?;

    Ok(AppConfig {
        database_url,
        log_level,
        search_url,
        base_url,
        jurisdiction,
        page_size,
        throttle_every,
        throttle_pause_secs,
        db_max_connections,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
