use ordo_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using OrdoError
pub type Result<T> = std::result::Result<T, OrdoError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable code that callers (the CRUD layer, the CLI,
/// tests) can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    InvalidPosition,

    // Lookup
    NotFound,
    AlreadyExists,

    // Ordering / concurrency
    SiblingConflict,
    LockScope,
    InvariantViolation,

    // Integration
    Config,
    Persistence,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidPosition => "ERR_INVALID_POSITION",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::SiblingConflict => "ERR_SIBLING_CONFLICT",
            ExErrorKind::LockScope => "ERR_LOCK_SCOPE",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether re-running the whole operation (fresh lock, fresh reads) may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExErrorKind::SiblingConflict)
    }
}

/// Canonical structured error type
///
/// Flattened view of an [`OrdoError`] with classification and context
/// fields, suitable for structured logs and for reporting across the
/// engine boundary.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    parent_id: Option<String>,
    position: Option<i64>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            parent_id: None,
            position: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_parent_id(mut self, id: impl Into<String>) -> Self {
        self.parent_id = Some(id.into());
        self
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// The offending or affected position, if any
    pub fn position(&self) -> Option<i64> {
        self.position
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(parent_id) = &self.parent_id {
            write!(f, " (parent_id: {})", parent_id)?;
        }
        if let Some(position) = self.position {
            write!(f, " (position: {})", position)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for positional ordering operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrdoError {
    // ===== Validation =====
    /// Position is zero, negative, or above the configured ceiling
    #[error("Invalid position {position}: must be between 1 and {max}")]
    InvalidPosition { position: i64, max: u32 },

    // ===== Lookup =====
    #[error("Record not found: {record_id}")]
    RecordNotFound { record_id: String },

    #[error("Parent not found: {parent_id}")]
    ParentNotFound { parent_id: String },

    #[error("Parent already exists: {parent_id}")]
    ParentAlreadyExists { parent_id: String },

    // ===== Ordering / concurrency =====
    /// Two siblings would share a position. Never expected under correct
    /// locking; callers may retry the whole operation.
    #[error("Sibling conflict under parent {parent_id}: {message}")]
    SiblingConflict {
        parent_id: String,
        position: Option<u32>,
        message: String,
    },

    /// A transaction tried to lock a second parent
    #[error("Lock scope is bound to parent {held}, cannot acquire {requested}")]
    LockScopeViolation { held: String, requested: String },

    #[error("Invariant violated under parent {parent_id}: {reason}")]
    InvariantViolation { parent_id: String, reason: String },

    // ===== Integration =====
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl OrdoError {
    /// Classification of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            OrdoError::InvalidPosition { .. } => ExErrorKind::InvalidPosition,
            OrdoError::RecordNotFound { .. } | OrdoError::ParentNotFound { .. } => {
                ExErrorKind::NotFound
            }
            OrdoError::ParentAlreadyExists { .. } => ExErrorKind::AlreadyExists,
            OrdoError::SiblingConflict { .. } => ExErrorKind::SiblingConflict,
            OrdoError::LockScopeViolation { .. } => ExErrorKind::LockScope,
            OrdoError::InvariantViolation { .. } => ExErrorKind::InvariantViolation,
            OrdoError::Config { .. } => ExErrorKind::Config,
            OrdoError::Persistence { .. } => ExErrorKind::Persistence,
            OrdoError::Io { .. } => ExErrorKind::Io,
            OrdoError::Internal { .. } => ExErrorKind::Internal,
        }
    }

    /// Only sibling conflicts are retryable; everything else is reported as-is
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Shorthand used where a lock was poisoned by a panicking holder
    pub fn poisoned(what: &str) -> Self {
        OrdoError::Internal {
            message: format!("{} lock poisoned", what),
        }
    }
}

impl From<OrdoError> for ExError {
    fn from(err: OrdoError) -> Self {
        let message = err.to_string();
        let ex = ExError::new(err.kind());
        match err {
            OrdoError::InvalidPosition { position, .. } => {
                ex.with_position(position).with_message(message)
            }
            OrdoError::RecordNotFound { record_id } => {
                ex.with_entity_id(record_id).with_message("Record not found")
            }
            OrdoError::ParentNotFound { parent_id } => {
                ex.with_parent_id(parent_id).with_message("Parent not found")
            }
            OrdoError::ParentAlreadyExists { parent_id } => ex
                .with_parent_id(parent_id)
                .with_message("Parent already exists"),
            OrdoError::SiblingConflict {
                parent_id,
                position,
                message,
            } => {
                let ex = ex.with_parent_id(parent_id).with_message(message);
                match position {
                    Some(p) => ex.with_position(i64::from(p)),
                    None => ex,
                }
            }
            OrdoError::LockScopeViolation { held, requested } => ex
                .with_parent_id(requested)
                .with_message(format!("Lock scope already bound to {}", held)),
            OrdoError::InvariantViolation { parent_id, reason } => {
                ex.with_parent_id(parent_id).with_message(reason)
            }
            OrdoError::Config { message }
            | OrdoError::Persistence { message }
            | OrdoError::Io { message }
            | OrdoError::Internal { message } => ex.with_message(message),
        }
    }
}

impl From<std::io::Error> for OrdoError {
    fn from(err: std::io::Error) -> Self {
        OrdoError::Io {
            message: err.to_string(),
        }
    }
}
