//! Recognizer source generation.
//!
//! A [`Generator`] checks the grammar through a [`Plan`], then asks a
//! [`Backend`] to write each piece of the standalone program: declarations,
//! the generic continuation matcher, one routine per non-terminal, the
//! dispatch table and the entry point. The whole program is assembled in
//! memory and only reaches the sink once every piece has been written.

mod c;
mod rust;

pub use c::CBackend;
pub use rust::RustBackend;

use std::fmt::{self, Write as _};
use std::io;

use crate::config::{GeneratorConfig, Target};
use crate::grammar::{Grammar, Symbol};
use crate::plan::{Plan, Rule};
use crate::utils::{GrammarError, Result};

/// Trait defining target-language specific emission
pub trait Backend {
    /// Name of the target language, used in error messages
    fn name(&self) -> &'static str;

    /// Reject symbols the target cannot carry inside a pattern literal
    fn check_symbol(&self, _symbol: Symbol) -> Result<()> {
        Ok(())
    }

    /// Header, continuation type and any forward declarations
    fn write_prelude(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result;

    /// The generic continuation matcher
    fn write_matcher(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result;

    /// The routine for one non-terminal
    fn write_rule(&self, out: &mut String, rule: &Rule<'_>, comments: bool) -> fmt::Result;

    /// Table from non-terminal symbol to routine
    fn write_dispatch(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result;

    /// Acceptance check and command-line driver
    fn write_entry(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result;
}

/// Emits recognizer programs according to a [`GeneratorConfig`]
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Generator { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the recognizer for `grammar` and write it to `sink`.
    ///
    /// Nothing is written if generation fails.
    pub fn generate<W: io::Write>(&self, grammar: &Grammar, sink: &mut W) -> Result<()> {
        let source = self.generate_to_string(grammar)?;
        sink.write_all(source.as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    /// Generate the recognizer for `grammar` as a string
    pub fn generate_to_string(&self, grammar: &Grammar) -> Result<String> {
        let plan = Plan::build(grammar, self.config.escape_mode)?;
        let comments = self.config.emit_comments;
        match self.config.target {
            Target::Rust => emit(&RustBackend, &plan, comments),
            Target::C => emit(&CBackend, &plan, comments),
        }
    }
}

/// Write a complete program for `plan` with `backend`
pub fn emit<B: Backend>(backend: &B, plan: &Plan<'_>, comments: bool) -> Result<String> {
    backend.check_symbol(plan.escape())?;
    for rule in plan.rules() {
        for rhs in rule.alternatives.iter() {
            for &b in rhs {
                backend.check_symbol(Symbol(b))?;
            }
        }
    }

    let mut out = String::new();
    write_program(backend, plan, comments, &mut out).map_err(|_| {
        GrammarError::InvalidGrammar(format!("failed to format {} output", backend.name()))
    })?;
    Ok(out)
}

fn write_program<B: Backend>(
    backend: &B,
    plan: &Plan<'_>,
    comments: bool,
    out: &mut String,
) -> fmt::Result {
    backend.write_prelude(out, plan)?;
    out.push('\n');
    backend.write_matcher(out, plan)?;
    for rule in plan.rules() {
        out.push('\n');
        backend.write_rule(out, rule, comments)?;
    }
    out.push('\n');
    backend.write_dispatch(out, plan)?;
    out.push('\n');
    backend.write_entry(out, plan)
}

/// Grammar name as it appears in the generated header comment
pub(crate) fn display_name(plan: &Plan<'_>) -> String {
    match plan.grammar().name() {
        Some(name) if !name.is_empty() => name.escape_default().to_string(),
        _ => "<unnamed>".to_string(),
    }
}

/// One-line summary of a rule, `S: "aS" | ""`, safe inside a line comment
pub(crate) fn describe_rule(rule: &Rule<'_>) -> String {
    let mut line = format!("{}:", rule.symbol);
    if rule.alternatives.is_empty() {
        line.push_str(" (no alternatives)");
    }
    for (i, rhs) in rule.alternatives.iter().enumerate() {
        let sep = if i == 0 { " " } else { " | " };
        let _ = write!(line, "{}\"{}\"", sep, rhs.escape_ascii());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EscapeMode;
    use crate::grammar::GrammarBuilder;
    use pretty_assertions::assert_eq;

    fn repetition() -> Grammar {
        GrammarBuilder::new('S')
            .name("G")
            .rule('S', "aS")
            .rule('S', "")
            .build()
    }

    #[test]
    fn test_undeclared_reference_writes_nothing() {
        let grammar = GrammarBuilder::new('S').rule('S', "aZ").build();

        let mut sink = Vec::new();
        let err = Generator::default().generate(&grammar, &mut sink).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::UndeclaredSymbolReference { symbol: Symbol(b'Z'), .. }
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_invalid_start_symbol_writes_nothing() {
        let mut grammar = repetition();
        grammar.set_initial(b'T');

        let mut sink = Vec::new();
        let config = GeneratorConfig::default().with_target(Target::C);
        let err = Generator::new(config).generate(&grammar, &mut sink).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidStartSymbol(_)));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_generate_writes_to_sink() {
        let grammar = repetition();
        let generator = Generator::default();

        let mut sink = Vec::new();
        generator.generate(&grammar, &mut sink).unwrap();
        assert_eq!(
            String::from_utf8(sink).unwrap(),
            generator.generate_to_string(&grammar).unwrap()
        );
    }

    #[test]
    fn test_pieces_in_order() {
        let grammar = GrammarBuilder::new('S')
            .rule('S', "AB")
            .rule('A', "a")
            .rule('B', "b")
            .build();
        let source = Generator::default().generate_to_string(&grammar).unwrap();

        let positions: Vec<usize> = [
            "struct Continuation",
            "fn match_pattern",
            "fn match_S",
            "fn match_A",
            "fn match_B",
            "const DISPATCH",
            "fn recognize",
            "fn main",
        ]
        .iter()
        .map(|needle| source.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_escape_mode_changes_matcher() {
        let grammar = repetition();

        let literal = Generator::default().generate_to_string(&grammar).unwrap();
        let skip = Generator::new(GeneratorConfig::default().with_escape_mode(EscapeMode::Skip))
            .generate_to_string(&grammar)
            .unwrap();
        assert_ne!(literal, skip);
    }

    #[test]
    fn test_describe_rule() {
        let grammar = GrammarBuilder::new('S')
            .rule('S', "a\\B")
            .rule('S', "")
            .build();
        let plan = Plan::build(&grammar, EscapeMode::Literal).unwrap();

        assert_eq!(describe_rule(&plan.rules()[0]), r#"S: "a\\B" | """#);
    }
}
