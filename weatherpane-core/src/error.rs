use thiserror::Error;

/// Errors produced by the weatherpane core.
///
/// Cache errors are advisory: the cache wrappers log and swallow them, so
/// only code calling the fallible `try_*` primitives ever sees them.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("failed to read cached location: {0}")]
    CacheReadFailed(String),

    #[error("failed to write cached location: {0}")]
    CacheWriteFailed(String),

    #[error("weather fetch failed: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("invalid coordinates: lat {lat}, lon {lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("invalid city data: {0}")]
    CityData(String),
}

/// Why a single provider round trip failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response contained no weather conditions")]
    MissingCondition,
}

impl FetchError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        FetchError::Status {
            status: status.as_u16(),
            body: truncate_body(body),
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_truncates_long_bodies() {
        let body = "x".repeat(500);
        let err = FetchError::from_status(reqwest::StatusCode::BAD_GATEWAY, &body);

        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body.len(), 203);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fetch_errors_surface_as_fetch_failed() {
        let err: WeatherError = FetchError::MissingCondition.into();
        assert!(matches!(err, WeatherError::FetchFailed(_)));
        assert!(err.to_string().starts_with("weather fetch failed"));
    }
}
