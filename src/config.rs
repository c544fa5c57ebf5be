use std::str::FromStr;

use dotenvy;

use crate::middleware::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_namespace: String,
    pub db_database: String,
    pub db_password: Option<String>,
    pub db_username: Option<String>,
    pub db_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub tracking: TrackingConfig,
    pub event_capacity: usize,
}

/// Site wide read tracking settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingConfig {
    pub enabled: bool,
    /// Posts older than this many days count as read, 0 turns the cutoff off.
    pub old_post_days: i64,
    /// Lets users opt out of forums with forced tracking.
    pub allow_forced: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            old_post_days: 14,
            allow_forced: false,
        }
    }
}

impl TrackingConfig {
    pub fn cutoff(&self, now: i64) -> Option<i64> {
        if self.old_post_days > 0 {
            Some(now - self.old_post_days * 86_400)
        } else {
            None
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match std::env::var(key) {
        Ok(value) => value.trim().parse::<T>().map_err(|_| AppError::Generic {
            description: format!("{key} has an invalid value: {value}"),
        }),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let db_namespace = std::env::var("DB_NAMESPACE").unwrap_or("namespace".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or("database".to_string());
        let db_password = std::env::var("DB_PASSWORD").ok();
        let db_username = std::env::var("DB_USERNAME").ok();
        let db_url = std::env::var("DB_URL").unwrap_or("mem://".to_string());

        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| AppError::Generic {
            description: "Missing JWT_SECRET in env".to_string(),
        })?;

        let tracking = TrackingConfig {
            enabled: env_or("FORUMX_TRACK_READ_POSTS", true)?,
            old_post_days: env_or("FORUMX_OLD_POST_DAYS", 14)?,
            allow_forced: env_or("FORUMX_ALLOW_FORCED_READ_TRACKING", false)?,
        };
        if tracking.old_post_days < 0 {
            return Err(AppError::Generic {
                description: "FORUMX_OLD_POST_DAYS must not be negative".to_string(),
            });
        }

        Ok(Self {
            db_namespace,
            db_database,
            db_password,
            db_username,
            db_url,
            jwt_secret,
            port: env_or("FORUMX_PORT", 8080)?,
            tracking,
            event_capacity: env_or("FORUMX_EVENT_CAPACITY", 100)?,
        })
    }
}
