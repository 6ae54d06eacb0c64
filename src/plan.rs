//! Checked, read-only view of a grammar shared by every consumer.
//!
//! Building a [`Plan`] is where generation-time errors surface: an undeclared
//! start symbol or a right-hand side that calls a non-terminal nobody
//! declared. Once a plan exists, every call through its dispatch table is
//! known to land on a rule.

use std::iter;

use crate::config::EscapeMode;
use crate::grammar::{Alternatives, Grammar, Symbol, SymbolKind, SYMBOL_COUNT};
use crate::utils::{GrammarError, Result};

/// One matching step decoded from the front of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Compare one input byte
    Literal(u8),
    /// Hand the rest of the input to a non-terminal's rule
    Call(Symbol),
}

/// A declared non-terminal and its alternatives
#[derive(Debug, Clone, Copy)]
pub struct Rule<'g> {
    pub symbol: Symbol,
    pub alternatives: &'g Alternatives,
}

impl Rule<'_> {
    /// Identifier fragment used to name this rule's routine in emitted code
    pub fn ident(&self) -> String {
        rule_ident(self.symbol)
    }
}

/// Identifier fragment for a symbol: the letter itself when it is a valid
/// identifier character, otherwise its hex value
pub fn rule_ident(symbol: Symbol) -> String {
    let value = symbol.value();
    if value.is_ascii_alphanumeric() {
        (value as char).to_string()
    } else {
        format!("x{:02x}", value)
    }
}

#[derive(Debug, Clone)]
pub struct Plan<'g> {
    grammar: &'g Grammar,
    initial: Symbol,
    escape_mode: EscapeMode,
    rules: Vec<Rule<'g>>,
    dispatch: [Option<usize>; SYMBOL_COUNT],
}

impl<'g> Plan<'g> {
    /// Validate `grammar` and build its dispatch table
    pub fn build(grammar: &'g Grammar, escape_mode: EscapeMode) -> Result<Self> {
        let initial = match grammar.initial() {
            Some(initial) if grammar.is_declared_non_terminal(initial) => initial,
            Some(initial) => return Err(GrammarError::InvalidStartSymbol(initial.to_string())),
            None => return Err(GrammarError::InvalidStartSymbol("<unset>".to_string())),
        };

        let mut rules = Vec::with_capacity(grammar.non_terminals().len());
        let mut dispatch = [None; SYMBOL_COUNT];
        for &symbol in grammar.non_terminals() {
            dispatch[symbol.index()] = Some(rules.len());
            rules.push(Rule {
                symbol,
                alternatives: grammar.alternatives(symbol),
            });
        }

        let plan = Plan {
            grammar,
            initial,
            escape_mode,
            rules,
            dispatch,
        };
        plan.check_references()?;
        Ok(plan)
    }

    fn check_references(&self) -> Result<()> {
        for rule in &self.rules {
            for (alternative, rhs) in rule.alternatives.iter().enumerate() {
                for step in self.steps(rhs) {
                    if let Step::Call(symbol) = step {
                        if self.dispatch(symbol).is_none() {
                            return Err(GrammarError::UndeclaredSymbolReference {
                                symbol,
                                lhs: rule.symbol,
                                alternative,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn initial(&self) -> Symbol {
        self.initial
    }

    pub fn escape(&self) -> Symbol {
        self.grammar.escape()
    }

    pub fn escape_mode(&self) -> EscapeMode {
        self.escape_mode
    }

    /// Rules in non-terminal declaration order
    pub fn rules(&self) -> &[Rule<'g>] {
        &self.rules
    }

    /// The rule invoked for `symbol`, if it is a declared non-terminal
    pub fn dispatch(&self, symbol: Symbol) -> Option<&Rule<'g>> {
        self.dispatch[symbol.index()].map(|i| &self.rules[i])
    }

    /// Decode the next step of `pattern`, returning it with the unconsumed rest.
    ///
    /// Escape markers never produce a step of their own. In
    /// [`EscapeMode::Literal`] the byte after a marker is a literal; in
    /// [`EscapeMode::Skip`] the marker is dropped and the byte after it is
    /// classified as usual. A trailing marker ends the pattern.
    pub fn next_step<'p>(&self, mut pattern: &'p [u8]) -> Option<(Step, &'p [u8])> {
        loop {
            let (&c, rest) = pattern.split_first()?;
            match self.grammar.classify(c) {
                SymbolKind::Escape => match self.escape_mode {
                    EscapeMode::Skip => pattern = rest,
                    EscapeMode::Literal => {
                        let (&literal, rest) = rest.split_first()?;
                        return Some((Step::Literal(literal), rest));
                    }
                },
                SymbolKind::NonTerminal => return Some((Step::Call(Symbol(c)), rest)),
                SymbolKind::Terminal => return Some((Step::Literal(c), rest)),
            }
        }
    }

    /// All steps of a right-hand side, left to right
    pub fn steps<'p>(&'p self, rhs: &'p [u8]) -> impl Iterator<Item = Step> + 'p {
        let mut pattern = rhs;
        iter::from_fn(move || {
            let (step, rest) = self.next_step(pattern)?;
            pattern = rest;
            Some(step)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use pretty_assertions::assert_eq;

    fn ab_grammar() -> Grammar {
        GrammarBuilder::new('S')
            .rule('S', "AB")
            .rule('A', "a")
            .rule('B', "b")
            .build()
    }

    #[test]
    fn test_rules_follow_declaration_order() {
        let grammar = ab_grammar();
        let plan = Plan::build(&grammar, EscapeMode::Literal).unwrap();

        let symbols: Vec<Symbol> = plan.rules().iter().map(|r| r.symbol).collect();
        assert_eq!(symbols, vec![Symbol(b'S'), Symbol(b'A'), Symbol(b'B')]);
        assert_eq!(plan.initial(), Symbol(b'S'));
        assert!(plan.dispatch(Symbol(b'A')).is_some());
        assert!(plan.dispatch(Symbol(b'a')).is_none());
    }

    #[test]
    fn test_undeclared_reference() {
        let grammar = GrammarBuilder::new('S')
            .rule('S', "a")
            .rule('S', "aZ")
            .build();

        let err = Plan::build(&grammar, EscapeMode::Literal).unwrap_err();
        match err {
            GrammarError::UndeclaredSymbolReference {
                symbol,
                lhs,
                alternative,
            } => {
                assert_eq!(symbol, Symbol(b'Z'));
                assert_eq!(lhs, Symbol(b'S'));
                assert_eq!(alternative, 1);
            }
            other => panic!("Expected UndeclaredSymbolReference, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_start_symbol() {
        let mut grammar = ab_grammar();
        grammar.set_initial(b'Q');
        assert!(matches!(
            Plan::build(&grammar, EscapeMode::Literal),
            Err(GrammarError::InvalidStartSymbol(s)) if s == "Q"
        ));

        let grammar = Grammar::new();
        assert!(matches!(
            Plan::build(&grammar, EscapeMode::Literal),
            Err(GrammarError::InvalidStartSymbol(_))
        ));
    }

    #[test]
    fn test_escaped_reference_depends_on_mode() {
        let grammar = GrammarBuilder::new('S').rule('S', "a\\Z").build();

        assert!(Plan::build(&grammar, EscapeMode::Literal).is_ok());
        assert!(matches!(
            Plan::build(&grammar, EscapeMode::Skip),
            Err(GrammarError::UndeclaredSymbolReference { .. })
        ));
    }

    #[test]
    fn test_steps_literal_mode() {
        let grammar = ab_grammar();
        let plan = Plan::build(&grammar, EscapeMode::Literal).unwrap();

        let steps: Vec<Step> = plan.steps(b"a\\AB\\\\").collect();
        assert_eq!(
            steps,
            vec![
                Step::Literal(b'a'),
                Step::Literal(b'A'),
                Step::Call(Symbol(b'B')),
                Step::Literal(b'\\'),
            ]
        );
        assert_eq!(plan.steps(b"a\\").collect::<Vec<_>>(), vec![Step::Literal(b'a')]);
    }

    #[test]
    fn test_steps_skip_mode() {
        let grammar = ab_grammar();
        let plan = Plan::build(&grammar, EscapeMode::Skip).unwrap();

        let steps: Vec<Step> = plan.steps(b"\\A\\\\b").collect();
        assert_eq!(steps, vec![Step::Call(Symbol(b'A')), Step::Literal(b'b')]);
    }

    #[test]
    fn test_rule_ident() {
        assert_eq!(rule_ident(Symbol(b'S')), "S");
        assert_eq!(rule_ident(Symbol(b'(')), "x28");
    }
}
