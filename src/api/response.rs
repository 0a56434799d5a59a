//! Uniform response envelope for single-item operations

use serde::Serialize;

/// `{succeeded, message, errors, data}` wrapper returned by every non-paged endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub succeeded: bool,
    pub message: Option<String>,
    pub errors: Vec<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: Some(message.into()),
            errors: Vec::new(),
            data: Some(data),
        }
    }

    pub fn data(data: T) -> Self {
        Self {
            succeeded: true,
            message: None,
            errors: Vec::new(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            succeeded: false,
            message: Some(message.into()),
            errors,
            data: None,
        }
    }
}
