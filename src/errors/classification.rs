use super::types::FairwayError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl FairwayError {
    /// Classify this error to determine its stable kind name and whether a
    /// caller may retry the operation.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Retryable errors
            FairwayError::Upload(_) => ErrorClassification {
                error_type: "upload_error",
                retryable: true,
            },
            FairwayError::Network(_) => ErrorClassification {
                error_type: "network_error",
                retryable: true,
            },
            FairwayError::Timeout(_) => ErrorClassification {
                error_type: "timeout_error",
                retryable: true,
            },
            FairwayError::Database(_) => ErrorClassification {
                error_type: "database_error",
                retryable: true,
            },
            FairwayError::Io(_) => ErrorClassification {
                error_type: "io_error",
                retryable: true,
            },
            FairwayError::Internal(_) => ErrorClassification {
                error_type: "internal_error",
                retryable: true,
            },

            // Non-retryable errors
            FairwayError::Validation(_) => ErrorClassification {
                error_type: "validation_error",
                retryable: false,
            },
            FairwayError::Processing(_) => ErrorClassification {
                error_type: "processing_error",
                retryable: false,
            },
            FairwayError::NotFound(_) => ErrorClassification {
                error_type: "not_found_error",
                retryable: false,
            },
            FairwayError::Conflict(_) => ErrorClassification {
                error_type: "conflict_error",
                retryable: false,
            },
            FairwayError::Cancelled(_) => ErrorClassification {
                error_type: "cancelled",
                retryable: false,
            },
            FairwayError::Config(_) => ErrorClassification {
                error_type: "config_error",
                retryable: false,
            },
            FairwayError::Authentication(_) => ErrorClassification {
                error_type: "authentication_error",
                retryable: false,
            },
            FairwayError::Json(_) => ErrorClassification {
                error_type: "json_error",
                retryable: false,
            },
            FairwayError::Yaml(_) => ErrorClassification {
                error_type: "yaml_error",
                retryable: false,
            },
        }
    }
}
