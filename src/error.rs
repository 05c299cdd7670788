//! Error types for closure instantiation and the environments it touches.

use thiserror::Error;

/// Failures surfaced by the descriptor/property layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectModelError {
    /// Redefinition rejected by a non-configurable property
    #[error("Cannot redefine property: {0}")]
    NonConfigurable(String),

    /// New property on a non-extensible object
    #[error("Cannot define property {0}, object is not extensible")]
    NotExtensible(String),

    /// Prototype link would form a cycle
    #[error("Cyclic __proto__ value")]
    CyclicPrototype,

    /// Handle does not name a live heap object
    #[error("object #{0} is not allocated in this heap")]
    DanglingObject(u64),
}

/// Errors raised while instantiating closures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A binding with this name already exists in the environment
    #[error("SyntaxError: Identifier '{0}' has already been declared")]
    DuplicateBinding(String),

    /// Binding read (or initialized) before it was set up
    #[error("ReferenceError: Cannot access '{0}' before initialization")]
    UninitializedBinding(String),

    /// No environment on the chain has this name
    #[error("ReferenceError: {0} is not defined")]
    UnresolvableReference(String),

    /// Strict assignment to an immutable binding
    #[error("TypeError: Assignment to constant variable '{0}'")]
    ImmutableBinding(String),

    /// The execution context stack is empty
    #[error("InternalError: no running execution context")]
    NoRunningContext,

    /// Descriptor failure from the object layer
    #[error("TypeError: {0}")]
    ObjectModel(#[from] ObjectModelError),
}

pub type Result<T> = std::result::Result<T, Error>;
