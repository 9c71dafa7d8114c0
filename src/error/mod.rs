use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Persisted client state errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("State store connection failed: {message}")]
    Connection { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Kind of transport failure (no response received)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The request exceeded the configured timeout.
    Timeout,
    /// The backend could not be reached (refused, DNS, network down).
    Connection,
    /// The connection broke while the body was being read.
    Interrupted,
    /// Anything else that produced no usable response.
    Other,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Timeout => write!(f, "timeout"),
            TransportKind::Connection => write!(f, "connection"),
            TransportKind::Interrupted => write!(f, "interrupted"),
            TransportKind::Other => write!(f, "other"),
        }
    }
}

/// Request gateway errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Transport error ({kind}): {message}")]
    Transport { kind: TransportKind, message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not found: {path}")]
    NotFoundIgnorable { path: String },

    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    #[error("Application error: {message}")]
    Application { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl GatewayError {
    /// True when no response was received from the backend.
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Transport { .. })
    }

    /// True for a 401 response.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized { .. })
    }

    /// True for a 403 response.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, GatewayError::Forbidden { .. })
    }
}

/// Session (authentication) errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication rejected: {message}")]
    Rejected { message: String },

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// True when the underlying cause is a transport failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, AuthError::Gateway(e) if e.is_transport())
    }
}

/// Review workspace errors
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Validation failed: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type alias for session operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for review operations
pub type ReviewResult<T> = Result<T, ReviewError>;
