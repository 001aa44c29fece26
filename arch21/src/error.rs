//!
//! # Arch21 Result and Error Types
//!

// Crates.io
use thiserror::Error;

// Local imports
use crate::utils::{self, display_stack, ErrorContext};

/// # [ArchError] Result Type
pub type ArchResult<T> = Result<T, ArchError>;

///
/// # Arch21 Error Enumeration
///
/// Every structural check in the model fails with one of these variants,
/// and leaves the model it was checking unmodified.
///
#[derive(Debug, Error)]
pub enum ArchError {
    /// Name collision within a namespace
    #[error("{kind} \"{name}\" already exists in {scope}")]
    DuplicateName {
        kind: &'static str,
        name: String,
        scope: String,
    },
    /// Pin range outside its port, or with `start > end`
    #[error("{0}")]
    Range(String),
    /// Instance index at or beyond a reference's instance count
    #[error("instance index {index} out of range for reference \"{alias}\" with {n_instances} instance(s)")]
    IndexOutOfRange {
        alias: String,
        index: usize,
        n_instances: usize,
    },
    /// Connection width rule violated
    #[error("{0}")]
    WidthMismatch(String),
    /// Sink pin already driven by another connection
    #[error("{0}")]
    MultipleDriver(String),
    /// Instancing would create a cycle
    #[error("component \"{component}\" cannot be instanced in \"{owner}\": the instancing graph would contain a cycle")]
    CyclicReference { component: String, owner: String },
    /// Names something which does not exist
    #[error("{0}")]
    UnresolvedReference(String),
    /// Removal of an entity still referenced by connections
    #[error("{0}")]
    InUse(String),
    /// Invalid scalar value
    #[error("{0}")]
    Value(String),
    /// Malformed document
    #[error("invalid document: {message} (at {})", display_stack(.stack))]
    Decode {
        message: String,
        stack: Vec<ErrorContext>,
        #[source]
        cause: Option<Box<ArchError>>,
    },
    /// Module which cannot be converted to its document
    #[error("cannot export module: {message} (at {})", display_stack(.stack))]
    Export {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Encoding or file failure
    #[error("serialization failed: {0}")]
    Serialization(#[from] utils::ser::Error),
}
impl ArchError {
    /// Create an [ArchError::Value] from anything String-convertible
    pub fn value(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }
    /// Wrap a document-level failure with no location
    pub(crate) fn decode(cause: ArchError) -> Self {
        Self::Decode {
            message: cause.to_string(),
            stack: Vec::new(),
            cause: Some(Box::new(cause)),
        }
    }
    /// The innermost model error of a [ArchError::Decode], or `self` for all other variants
    pub fn root_cause(&self) -> &ArchError {
        match self {
            Self::Decode {
                cause: Some(cause), ..
            } => cause.root_cause(),
            _ => self,
        }
    }
}
