use thiserror::Error;

/// Result type alias using NavTreeError
pub type Result<T> = std::result::Result<T, NavTreeError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and CLI exit reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    AlreadyExists,
    CycleDetected,
    BrokenClosure,

    // Build
    BuildFailed,

    // Integration/IO
    Config,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::BrokenClosure => "ERR_BROKEN_CLOSURE",
            ExErrorKind::BuildFailed => "ERR_BUILD_FAILED",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and context for
/// debugging. Produced from [`NavTreeError`] at reporting boundaries.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
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

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
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
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for navtree operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavTreeError {
    // ===== Structural Errors =====
    /// Item not found in store
    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: String },

    /// Navigation not found in store (by id or code)
    #[error("Navigation not found: {navigation}")]
    NavigationNotFound { navigation: String },

    /// Navigation code is already used by another navigation
    #[error("Navigation code already taken: {code}")]
    NavigationCodeTaken { code: String },

    /// Navigation code is empty or contains whitespace
    #[error("Invalid navigation code '{code}': {reason}")]
    InvalidCode { code: String, reason: String },

    /// Parent has no self-relationship, so it is not part of any tree
    #[error("Parent item {parent_id} has no self-relationship closure record")]
    ParentNotInTree { parent_id: String },

    /// Moving an item below itself or one of its descendants
    #[error("Cycle detected: cannot move item {item_id} under {parent_id}")]
    CycleDetected { item_id: String, parent_id: String },

    /// Source taxon not found
    #[error("Taxon not found: {taxon_code}")]
    TaxonNotFound { taxon_code: String },

    /// A source node's parent was not mapped before the node itself
    #[error("Taxon {taxon_code} visited before its parent {parent_id}")]
    TaxonOrderViolation {
        taxon_code: String,
        parent_id: String,
    },

    /// No item factory registered under this type name
    #[error("Unknown item type: {type_name}")]
    UnknownItemType { type_name: String },

    // ===== Build Errors =====
    /// Bulk build failed; the navigation was left in the FAILED state
    #[error("Building navigation {navigation_code} failed: {cause}")]
    BuildFailed {
        navigation_code: String,
        #[source]
        cause: Box<NavTreeError>,
    },

    // ===== Generic Errors =====
    /// Storage backend failure
    #[error("Persistence error in {op}: {message}")]
    Persistence { op: String, message: String },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization error (JSON/YAML/TOML encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl NavTreeError {
    /// Helper used by storage backends
    pub fn persistence(op: impl Into<String>, message: impl Into<String>) -> Self {
        NavTreeError::Persistence {
            op: op.into(),
            message: message.into(),
        }
    }
}

/// Conversion from NavTreeError to ExError
impl From<NavTreeError> for ExError {
    fn from(err: NavTreeError) -> Self {
        match err {
            NavTreeError::ItemNotFound { item_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(item_id)
                .with_message("Item not found"),

            NavTreeError::NavigationNotFound { navigation } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(navigation)
                    .with_message("Navigation not found")
            }

            NavTreeError::NavigationCodeTaken { code } => ExError::new(ExErrorKind::AlreadyExists)
                .with_entity_id(code)
                .with_message("Navigation code already taken"),

            NavTreeError::InvalidCode { code, reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(code)
                .with_message(reason),

            NavTreeError::ParentNotInTree { parent_id } => {
                ExError::new(ExErrorKind::BrokenClosure)
                    .with_entity_id(parent_id)
                    .with_message("Parent has no self-relationship")
            }

            NavTreeError::CycleDetected { item_id, parent_id } => {
                ExError::new(ExErrorKind::CycleDetected)
                    .with_entity_id(item_id)
                    .with_op("move_item")
                    .with_message(format!("New parent {} is a descendant", parent_id))
            }

            NavTreeError::TaxonNotFound { taxon_code } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(taxon_code)
                .with_message("Taxon not found"),

            NavTreeError::TaxonOrderViolation {
                taxon_code,
                parent_id,
            } => ExError::new(ExErrorKind::BrokenClosure)
                .with_entity_id(taxon_code)
                .with_op("build_from_taxon")
                .with_message(format!("Parent {} was not visited first", parent_id)),

            NavTreeError::UnknownItemType { type_name } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(type_name)
                .with_message("Unknown item type"),

            NavTreeError::BuildFailed {
                navigation_code,
                cause,
            } => ExError::new(ExErrorKind::BuildFailed)
                .with_entity_id(navigation_code)
                .with_op("build_from_taxon")
                .with_message("Navigation build failed")
                .with_source((*cause).into()),

            NavTreeError::Persistence { op, message } => ExError::new(ExErrorKind::Persistence)
                .with_op(op)
                .with_message(message),

            NavTreeError::Config { message } => {
                ExError::new(ExErrorKind::Config).with_message(message)
            }

            NavTreeError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            NavTreeError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ExErrorKind::NotFound.code(), "ERR_NOT_FOUND");
        assert_eq!(ExErrorKind::BuildFailed.code(), "ERR_BUILD_FAILED");
    }

    #[test]
    fn test_parent_not_in_tree_names_no_op() {
        let ex: ExError = NavTreeError::ParentNotInTree {
            parent_id: "p1".to_string(),
        }
        .into();

        assert_eq!(ex.kind(), ExErrorKind::BrokenClosure);
        assert_eq!(ex.entity_id(), Some("p1"));
        assert_eq!(ex.op(), None);
    }

    #[test]
    fn test_build_failed_keeps_cause() {
        let err = NavTreeError::BuildFailed {
            navigation_code: "main".to_string(),
            cause: Box::new(NavTreeError::TaxonNotFound {
                taxon_code: "shoes".to_string(),
            }),
        };

        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::BuildFailed);
        assert_eq!(ex.entity_id(), Some("main"));
        let source = ex.source_error().unwrap();
        assert_eq!(source.kind(), ExErrorKind::NotFound);
        assert_eq!(source.entity_id(), Some("shoes"));
    }

    #[test]
    fn test_display_includes_code_and_message() {
        let ex: ExError = NavTreeError::ItemNotFound {
            item_id: "i1".to_string(),
        }
        .into();
        let rendered = ex.to_string();
        assert!(rendered.contains("ERR_NOT_FOUND"));
        assert!(rendered.contains("i1"));
    }
}
