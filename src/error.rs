//! Error types for lazydots

use thiserror::Error;

/// Errors raised while inspecting, converting or rebinding lazy arguments
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Shape errors
    /// Input was not the shape an operation requires
    ///
    /// **Triggered by:** Passing a flat sequence where a chain is required, a
    /// generic pairlist where a variadic chain is required, or a dangling
    /// scope handle
    /// **Example:** `dots_length(&Value::Int(3))`
    #[error("Type error: expected {expected}, got {got}")]
    TypeError {
        /// Expected shape
        expected: String,
        /// Actual shape
        got: String,
    },

    // Scope errors
    /// Scope lookup for a required name failed
    ///
    /// **Triggered by:** Extracting a name that is bound nowhere on the scope chain
    #[error("Variable `{name}` was not found")]
    UndefinedVariable {
        /// Variable name
        name: String,
    },

    /// Attempt to define a chain node that carries no name
    ///
    /// **Triggered by:** Injecting a variadic chain containing a positional argument
    /// **Prevention:** Name every node, or pass positional nodes as the extra variadic chain
    #[error("Attempt to assign variable with no name (position {position})")]
    UnnamedBinding {
        /// Zero-based position of the offending node
        position: usize,
    },

    /// Attempt to define a reserved name
    ///
    /// **Triggered by:** Injecting a node named `...`, or extracting `...` unexpanded
    /// under [`VariadicPolicy::Reject`](crate::VariadicPolicy::Reject)
    #[error("Illegal variable name `{name}`")]
    ReservedName {
        /// The rejected name
        name: String,
    },

    /// Read of a deferred cell's value before it has been forced
    #[error("Promise has not been forced")]
    UnboundValue,

    // Reader errors
    /// Syntax error encountered while reading an expression
    #[error("Syntax error at line {line}, column {col}: {message}")]
    SyntaxError {
        /// Line number where error occurred
        line: usize,
        /// Column number where error occurred
        col: usize,
        /// Error description
        message: String,
    },

    /// General parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Unexpected end of input while reading an expression
    #[error("Unexpected end of file")]
    UnexpectedEof,
}

impl Error {
    /// Create a type error from an expected description and the actual type name
    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeError {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

/// Result type for lazydots operations
pub type Result<T> = std::result::Result<T, Error>;
