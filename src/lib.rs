//! Interpreter for brainrot, a small imperative scripting language.
//!
//! Source goes through [`lexer::tokenize`], [`parser::parse`] and
//! [`interpreter::evaluate`]; a [`session::Session`] strings those together
//! behind a line-buffered read-eval loop.

pub mod ast;
pub mod environment;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod session;
pub mod utils;
pub mod value;

pub use environment::Environment;
pub use interpreter::{evaluate, Effects, Fault, Interrupted, Options, Outcome};
pub use session::{Console, Session, SessionConfig};
pub use value::{Number, Value};
