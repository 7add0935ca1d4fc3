use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: u16,
    },

    #[error("{endpoint} response has no \"result\" field")]
    MissingResult { endpoint: &'static str },

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid hour {0}, expected 0-23")]
    InvalidHour(u32),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for DashboardError {
    fn from(e: rusqlite::Error) -> Self {
        DashboardError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for DashboardError {
    fn from(e: r2d2::Error) -> Self {
        DashboardError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_endpoint() {
        let err = DashboardError::Status {
            endpoint: "indicators",
            status: 502,
        };
        assert_eq!(err.to_string(), "indicators returned HTTP 502");
    }

    #[test]
    fn invalid_hour_message() {
        assert_eq!(
            DashboardError::InvalidHour(24).to_string(),
            "invalid hour 24, expected 0-23"
        );
    }
}
