use crate::constants::system;
use crate::error::{BookingError, Result};

#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub default_page_limit: i64,
    pub max_page_limit: i64,
    pub min_update_lead_time_hours: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost/venue_booking_development".to_string(),
            max_connections: 10,
            default_page_limit: system::DEFAULT_PAGE_LIMIT,
            max_page_limit: system::MAX_PAGE_LIMIT,
            min_update_lead_time_hours: system::MIN_UPDATE_LEAD_TIME_HOURS,
        }
    }
}

impl BookingConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(db_url) = std::env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(max) = std::env::var("BOOKING_MAX_CONNECTIONS") {
            config.max_connections = max.parse().map_err(|e| {
                BookingError::Configuration(format!("Invalid max_connections: {e}"))
            })?;
        }

        if let Ok(limit) = std::env::var("BOOKING_MAX_PAGE_LIMIT") {
            config.max_page_limit = limit.parse().map_err(|e| {
                BookingError::Configuration(format!("Invalid max_page_limit: {e}"))
            })?;
        }

        if let Ok(hours) = std::env::var("BOOKING_MIN_LEAD_TIME_HOURS") {
            config.min_update_lead_time_hours = hours.parse().map_err(|e| {
                BookingError::Configuration(format!("Invalid min_update_lead_time_hours: {e}"))
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BookingConfig::default();
        assert_eq!(config.min_update_lead_time_hours, 24);
        assert_eq!(config.max_page_limit, 100);
    }
}
