#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub search_url: String,
    pub base_url: String,
    /// Tag written to every stored row, e.g. the county being collected.
    pub jurisdiction: String,
    pub page_size: u32,
    pub throttle_every: usize,
    pub throttle_pause_secs: u64,
    pub db_max_connections: u32,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("search_url", &self.search_url)
            .field("base_url", &self.base_url)
            .field("jurisdiction", &self.jurisdiction)
            .field("page_size", &self.page_size)
            .field("throttle_every", &self.throttle_every)
            .field("throttle_pause_secs", &self.throttle_pause_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_ms",
                &self.scraper_retry_backoff_base_ms,
            )
            .finish()
    }
}
