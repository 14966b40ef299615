use storelytics_appstore::AppStoreError;
use storelytics_core::ValidationError;
use thiserror::Error;

/// Failures surfaced by [`crate::ReviewPipeline`] operations.
///
/// Each variant has a stable [`code`](Self::code) so callers can tell
/// retryable upstream trouble apart from bad input or missing data.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    NotFound(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Upstream(_) => "upstream_error",
            Self::Validation(_) => "validation_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub(crate) fn app_not_found(app_id: &str, country: &str) -> Self {
        Self::NotFound(format!(
            "App with ID '{app_id}' not found in {} App Store",
            country.to_uppercase()
        ))
    }

    pub(crate) fn reviews_not_found(app_id: &str, country: &str) -> Self {
        Self::NotFound(format!(
            "No reviews found for app ID '{app_id}' in {} App Store",
            country.to_uppercase()
        ))
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(message))
    }
}

impl From<AppStoreError> for PipelineError {
    fn from(err: AppStoreError) -> Self {
        match err {
            AppStoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            AppStoreError::InvalidBaseUrl { .. } | AppStoreError::Snapshot { .. } => {
                Self::Internal(err.to_string())
            }
            AppStoreError::Http(_)
            | AppStoreError::Deserialize { .. }
            | AppStoreError::RateLimited { .. }
            | AppStoreError::UnexpectedStatus { .. } => Self::Upstream(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_per_kind() {
        let codes = [
            PipelineError::NotFound(String::new()).code(),
            PipelineError::Upstream(String::new()).code(),
            PipelineError::validation("x").code(),
            PipelineError::Internal(String::new()).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn upstream_status_maps_to_upstream() {
        let err: PipelineError = AppStoreError::UnexpectedStatus {
            status: 503,
            url: "https://catalog.test".to_string(),
        }
        .into();
        assert_eq!(err.code(), "upstream_error");
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn not_found_messages_name_the_storefront() {
        let err = PipelineError::reviews_not_found("12345678", "us");
        assert_eq!(
            err.to_string(),
            "No reviews found for app ID '12345678' in US App Store"
        );
    }
}
