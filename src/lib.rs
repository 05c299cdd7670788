pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod keys;
pub mod types;

pub use ast::{FunctionDefinition, Species};
pub use config::EngineConfig;
pub use error::{Error, ObjectModelError, Result};
pub use interpreter::{Closure, Interpreter};
