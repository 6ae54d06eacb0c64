//! Grammar description reader.
//!
//! Reads the notation that `Grammar`'s `Display` prints:
//!
//! ```text
//! G = (
//!     { S, A, }
//!     { a, b, }
//!     S,
//!     {
//!         S->aA
//!         A->b
//!         A->
//!     }
//! )
//! ```
//!
//! The first set lists non-terminals, the second terminals, then the start
//! symbol and one `X->rhs` line per alternative. An empty right-hand side is
//! epsilon. Lines starting with `#` are comments. Right-hand sides are
//! trimmed, so whitespace terminals cannot be written in this notation.

use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use crate::grammar::{decode_symbol, Grammar, Symbol};
use crate::utils::{GrammarError, Result};

/// Section of the description the reader expects next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    NonTerminals,
    Terminals,
    Initial,
    ProductionsOpen,
    Productions,
    Close,
    Done,
}

struct Patterns {
    header: Regex,
    set: Regex,
    initial: Regex,
    production: Regex,
}

impl Patterns {
    fn new() -> Result<Self> {
        let compile = |pattern: &str| Regex::new(pattern).map_err(|e| GrammarError::Parse(e.to_string()));
        Ok(Patterns {
            header: compile(r"^(\S*?)\s*=\s*\($")?,
            set: compile(r"^\{(.*)\}\s*,?$")?,
            initial: compile(r"^(\\x[0-9A-Fa-f]{2}|\S)\s*,?$")?,
            production: compile(r"^(\\x[0-9A-Fa-f]{2}|\S)\s*->(.*)$")?,
        })
    }
}

/// Parse a grammar from a file
pub fn read_grammar_file<P: AsRef<Path>>(path: P) -> Result<Grammar> {
    let file = File::open(path).map_err(GrammarError::Io)?;
    read_grammar(io::BufReader::new(file))
}

/// Parse a grammar from a string
pub fn parse_grammar(text: &str) -> Result<Grammar> {
    read_grammar(text.as_bytes())
}

/// Parse a grammar from any buffered reader
pub fn read_grammar<R: BufRead>(reader: R) -> Result<Grammar> {
    let patterns = Patterns::new()?;
    let mut grammar = Grammar::new();
    let mut section = Section::Header;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(GrammarError::Io)?;
        let number = index + 1;
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        section = match section {
            Section::Header => {
                let captures = patterns
                    .header
                    .captures(trimmed)
                    .ok_or_else(|| parse_error(number, "expected `name = (`"))?;
                let name = &captures[1];
                if !name.is_empty() {
                    grammar.set_name(name);
                }
                Section::NonTerminals
            }
            Section::NonTerminals => {
                for symbol in parse_set(&patterns, trimmed, number)? {
                    grammar.declare_non_terminal(symbol);
                }
                Section::Terminals
            }
            Section::Terminals => {
                for symbol in parse_set(&patterns, trimmed, number)? {
                    grammar.declare_terminal(symbol);
                }
                Section::Initial
            }
            Section::Initial => {
                let captures = patterns
                    .initial
                    .captures(trimmed)
                    .ok_or_else(|| parse_error(number, "expected the start symbol"))?;
                grammar.set_initial(symbol_at(&captures[1], number)?);
                Section::ProductionsOpen
            }
            Section::ProductionsOpen => {
                if trimmed != "{" {
                    return Err(parse_error(number, "expected `{` opening the productions"));
                }
                Section::Productions
            }
            Section::Productions => {
                if trimmed == "}" {
                    Section::Close
                } else {
                    let captures = patterns
                        .production
                        .captures(trimmed)
                        .ok_or_else(|| parse_error(number, "expected a production `X->rhs`"))?;
                    let lhs = symbol_at(&captures[1], number)?;
                    grammar.add_alternative(lhs, captures[2].trim().as_bytes());
                    Section::Productions
                }
            }
            Section::Close => {
                if trimmed != ")" {
                    return Err(parse_error(number, "expected `)` closing the grammar"));
                }
                Section::Done
            }
            Section::Done => {
                return Err(parse_error(number, "unexpected text after the grammar"));
            }
        };
    }

    if section != Section::Done {
        return Err(GrammarError::Parse(format!(
            "unexpected end of input while reading {:?}",
            section
        )));
    }

    Ok(grammar)
}

fn parse_set(patterns: &Patterns, line: &str, number: usize) -> Result<Vec<Symbol>> {
    let captures = patterns
        .set
        .captures(line)
        .ok_or_else(|| parse_error(number, "expected a symbol set `{ ... }`"))?;

    captures[1]
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| symbol_at(token, number))
        .collect()
}

fn symbol_at(token: &str, number: usize) -> Result<Symbol> {
    decode_symbol(token).ok_or_else(|| parse_error(number, &format!("invalid symbol `{}`", token)))
}

fn parse_error(number: usize, message: &str) -> GrammarError {
    GrammarError::Parse(format!("line {}: {}", number, message))
}
