use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    /// Trailing days scanned by the backfill reconciler.
    pub backfill_window_days: u32,

    // Rate limiting
    pub rate_mark_per_min: u32,
    pub rate_leave_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Outbound email API for leave notifications; disabled when unset.
    pub email_api_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),

            backfill_window_days: env::var("BACKFILL_WINDOW_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .unwrap(),

            rate_mark_per_min: env::var("RATE_MARK_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_leave_per_min: env::var("RATE_LEAVE_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            email_api_url: env::var("EMAIL_API_URL").ok(),
        }
    }
}
