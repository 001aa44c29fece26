//!
//! # Error Contexts
//!

// Std-Lib
use std::fmt;

/// Enumerated conversion contexts
/// Generally used for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    Module(String),
    Component(String),
    Port(String),
    Reference(String),
    Connection(usize),
    Source(usize),
    Sink(usize),
}
impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Module(n) => write!(f, "module \"{}\"", n),
            Self::Component(n) => write!(f, "component \"{}\"", n),
            Self::Port(n) => write!(f, "port \"{}\"", n),
            Self::Reference(n) => write!(f, "reference \"{}\"", n),
            Self::Connection(i) => write!(f, "connection #{}", i),
            Self::Source(i) => write!(f, "source #{}", i),
            Self::Sink(i) => write!(f, "sink #{}", i),
        }
    }
}

/// Render a context stack outermost-first, e.g.
/// `module "m" / component "c1" / connection #0`.
pub fn display_stack(stack: &[ErrorContext]) -> String {
    stack
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" / ")
}
