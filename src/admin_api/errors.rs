//! Error types for calls to the external administration API.
//!
//! These errors describe why a single request against the administration API
//! failed. They carry no knowledge of attribute groups or of the deletion
//! workflow; higher layers wrap them with that context.

use std::fmt;

/// Errors that can occur while talking to the administration API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminApiError {
    /// The realm addressed by the request does not exist.
    RealmNotFound { realm: String },

    /// The API rejected the request (validation failure, bad input).
    Rejected { status: u16, message: String },

    /// The caller lacks the role required for the operation.
    PermissionDenied { operation: String, resource: String },

    /// The API could not be reached or answered with a server error.
    Unavailable {
        message: String,
        endpoint: Option<String>,
    },

    /// A payload could not be encoded or decoded.
    Serialization {
        message: String,
        data_type: Option<String>,
    },
}

impl fmt::Display for AdminApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminApiError::RealmNotFound { realm } => {
                write!(f, "Realm not found: {}", realm)
            }
            AdminApiError::Rejected { status, message } => {
                write!(f, "Request rejected ({}): {}", status, message)
            }
            AdminApiError::PermissionDenied {
                operation,
                resource,
            } => {
                write!(f, "Permission denied: {} on {}", operation, resource)
            }
            AdminApiError::Unavailable { message, endpoint } => {
                if let Some(ep) = endpoint {
                    write!(
                        f,
                        "Administration API unavailable: {} (endpoint: {})",
                        message, ep
                    )
                } else {
                    write!(f, "Administration API unavailable: {}", message)
                }
            }
            AdminApiError::Serialization { message, data_type } => {
                if let Some(dtype) = data_type {
                    write!(f, "Serialization error: {} (type: {})", message, dtype)
                } else {
                    write!(f, "Serialization error: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for AdminApiError {}

impl AdminApiError {
    /// Create a new RealmNotFound error.
    pub fn realm_not_found(realm: impl Into<String>) -> Self {
        Self::RealmNotFound {
            realm: realm.into(),
        }
    }

    /// Create a new Rejected error with HTTP-style status 400.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Rejected {
            status: 400,
            message: message.into(),
        }
    }

    /// Create a new PermissionDenied error.
    pub fn permission_denied(operation: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::PermissionDenied {
            operation: operation.into(),
            resource: resource.into(),
        }
    }

    /// Create a new Unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            endpoint: None,
        }
    }

    /// Create a new Unavailable error for a specific endpoint.
    pub fn unavailable_at(message: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            endpoint: Some(endpoint.into()),
        }
    }

    /// Create a new Serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
            data_type: None,
        }
    }

    /// Check if this error means the addressed realm is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdminApiError::RealmNotFound { .. })
    }

    /// Check if the API refused the request on its merits (as opposed to being unreachable).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AdminApiError::Rejected { .. } | AdminApiError::PermissionDenied { .. }
        )
    }
}

impl From<serde_json::Error> for AdminApiError {
    fn from(error: serde_json::Error) -> Self {
        AdminApiError::serialization(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            AdminApiError::realm_not_found("photoz").to_string(),
            "Realm not found: photoz"
        );
        assert_eq!(
            AdminApiError::bad_request("duplicate group").to_string(),
            "Request rejected (400): duplicate group"
        );
        assert_eq!(
            AdminApiError::unavailable_at("timeout", "/admin/realms/photoz").to_string(),
            "Administration API unavailable: timeout (endpoint: /admin/realms/photoz)"
        );
    }

    #[test]
    fn test_classification() {
        assert!(AdminApiError::realm_not_found("x").is_not_found());
        assert!(AdminApiError::bad_request("x").is_rejection());
        assert!(AdminApiError::permission_denied("save", "profile").is_rejection());
        assert!(!AdminApiError::unavailable("down").is_rejection());
    }
}
