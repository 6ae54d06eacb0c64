//! rd-gen turns a small context-free grammar into a standalone backtracking
//! recursive-descent recognizer.
//!
//! Grammars use single-byte symbols: uppercase ASCII letters are
//! non-terminals, everything else is a terminal, and an escape marker (`\` by
//! default) forces the following symbol to be read literally. The emitted
//! program threads an explicit continuation chain through its matching
//! routines, so a non-terminal that succeeds hands the remaining input to
//! whatever its callers still have to match.
//!
//! # Example
//!
//! ```rust
//! use rd_gen::{Generator, GeneratorConfig, GrammarBuilder, Recognizer};
//!
//! // S -> aS | ε
//! let grammar = GrammarBuilder::new('S')
//!     .name("repeat")
//!     .rule('S', "aS")
//!     .rule('S', "")
//!     .build();
//!
//! let config = GeneratorConfig::default();
//! let recognizer = Recognizer::new(&grammar, &config).unwrap();
//! assert!(recognizer.recognize(b"aaa").unwrap());
//! assert!(!recognizer.recognize(b"aab").unwrap());
//!
//! let source = Generator::new(config).generate_to_string(&grammar).unwrap();
//! assert!(source.contains("fn match_S("));
//! ```

pub mod config;
pub mod generator;
pub mod grammar;
pub mod plan;
pub mod reader;
pub mod recognizer;
pub mod sample;
pub mod utils;

pub use config::{EscapeMode, GeneratorConfig, Target};
pub use generator::{Backend, CBackend, Generator, RustBackend};
pub use grammar::{Grammar, GrammarBuilder, Symbol, SymbolKind};
pub use plan::{Plan, Step};
pub use reader::{parse_grammar, read_grammar_file};
pub use recognizer::{Continuation, Derivation, Recognizer};
pub use sample::Sampler;
pub use utils::{GrammarError, Result};
