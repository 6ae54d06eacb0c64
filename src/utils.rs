use std::io;
use thiserror::Error;

use crate::grammar::Symbol;

/// Custom error types for grammar handling and recognizer generation
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid grammar: {0}")]
    InvalidGrammar(String),

    /// A right-hand side names a non-terminal that was never declared
    #[error("Undeclared symbol reference: {symbol} in alternative {alternative} of {lhs}")]
    UndeclaredSymbolReference {
        symbol: Symbol,
        lhs: Symbol,
        alternative: usize,
    },

    #[error("Invalid start symbol: {0} is not a declared non-terminal")]
    InvalidStartSymbol(String),

    #[error("Symbol {symbol} cannot be represented in {target} output")]
    UnrepresentableSymbol { symbol: Symbol, target: &'static str },

    #[error("Recursion depth {0} exceeded")]
    DepthExceeded(usize),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

/// Hard failure path for storage exhaustion while a grammar is being built.
///
/// There is no recovery: the grammar clears itself first, then the process
/// terminates.
pub fn memory_error() -> ! {
    eprintln!("Aborting due to memory error");
    std::process::exit(1)
}

/// Trait extension for Option<T> to convert to GrammarError
pub trait OptionExt<T> {
    fn ok_or_grammar_err<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_grammar_err<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.ok_or_else(|| GrammarError::InvalidGrammar(f()))
    }
}
