//! In-process backtracking recognizer.
//!
//! Runs the same algorithm the emitted programs run, directly over a
//! [`Plan`]. Each rule activation owns one [`Continuation`] on its stack
//! frame; the chain of parents records what every enclosing level still has
//! to match once the current non-terminal is done.

use crate::config::GeneratorConfig;
use crate::grammar::{Grammar, Symbol};
use crate::plan::{Plan, Step};
use crate::utils::{GrammarError, Result};

/// Pattern left to match at one nesting level, plus the enclosing obligation
#[derive(Debug, Clone, Copy)]
pub struct Continuation<'a> {
    pub pattern: &'a [u8],
    pub parent: Option<&'a Continuation<'a>>,
}

impl Continuation<'_> {
    /// The outermost continuation: nothing left to match, no parent
    pub fn outermost() -> Continuation<'static> {
        Continuation {
            pattern: &[],
            parent: None,
        }
    }

    /// Number of continuations in the chain, this one included
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.parent;
        while let Some(parent) = current {
            depth += 1;
            current = parent.parent;
        }
        depth
    }
}

/// Alternatives chosen by a successful match, in the order they were entered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Derivation {
    pub choices: Vec<(Symbol, usize)>,
}

impl Derivation {
    /// Alternative index chosen for the first activation of `symbol`
    pub fn first_choice(&self, symbol: Symbol) -> Option<usize> {
        self.choices
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|&(_, alternative)| alternative)
    }
}

#[derive(Debug, Clone)]
pub struct Recognizer<'g> {
    plan: Plan<'g>,
    max_depth: Option<usize>,
}

impl<'g> Recognizer<'g> {
    /// Check `grammar` and prepare a recognizer for it
    pub fn new(grammar: &'g Grammar, config: &GeneratorConfig) -> Result<Self> {
        let plan = Plan::build(grammar, config.escape_mode)?;
        Ok(Self::from_plan(plan, config.max_depth))
    }

    pub fn from_plan(plan: Plan<'g>, max_depth: Option<usize>) -> Self {
        Recognizer { plan, max_depth }
    }

    pub fn plan(&self) -> &Plan<'g> {
        &self.plan
    }

    /// Whether `input` is accepted from the start symbol
    pub fn recognize(&self, input: &[u8]) -> Result<bool> {
        Ok(self.derive(input)?.is_some())
    }

    /// The accepted derivation of `input`, or `None` if it is rejected
    pub fn derive(&self, input: &[u8]) -> Result<Option<Derivation>> {
        let mut derivation = Derivation::default();
        let outermost = Continuation::outermost();
        let accepted =
            self.match_rule(self.plan.initial(), input, &outermost, 0, &mut derivation)?;
        Ok(accepted.then_some(derivation))
    }

    /// Try each alternative of `symbol` in order; the first success wins
    fn match_rule(
        &self,
        symbol: Symbol,
        input: &[u8],
        continuation: &Continuation<'_>,
        depth: usize,
        derivation: &mut Derivation,
    ) -> Result<bool> {
        let Some(rule) = self.plan.dispatch(symbol) else {
            return Ok(false);
        };

        for (index, rhs) in rule.alternatives.iter().enumerate() {
            let mark = derivation.choices.len();
            derivation.choices.push((symbol, index));

            let next = Continuation {
                pattern: rhs,
                parent: Some(continuation),
            };
            if self.match_pattern(input, &next, depth + 1, derivation)? {
                return Ok(true);
            }
            derivation.choices.truncate(mark);
        }
        Ok(false)
    }

    /// Match `continuation` and then every enclosing obligation.
    ///
    /// `depth` counts the rule levels entered since the last consumed byte,
    /// less the levels finished since then. Only nesting that consumes
    /// nothing can grow it without bound, which is what left recursion does.
    fn match_pattern(
        &self,
        mut input: &[u8],
        continuation: &Continuation<'_>,
        mut depth: usize,
        derivation: &mut Derivation,
    ) -> Result<bool> {
        if let Some(max_depth) = self.max_depth {
            if depth > max_depth {
                return Err(GrammarError::DepthExceeded(max_depth));
            }
        }

        let mut pattern = continuation.pattern;
        while let Some((step, rest)) = self.plan.next_step(pattern) {
            pattern = rest;
            match step {
                Step::Call(symbol) => {
                    // The rule consumes whatever the non-terminal derives, then
                    // resumes with the rest of this pattern.
                    let next = Continuation {
                        pattern,
                        parent: continuation.parent,
                    };
                    return self.match_rule(symbol, input, &next, depth, derivation);
                }
                Step::Literal(c) => match input.split_first() {
                    Some((&head, tail)) if head == c => {
                        input = tail;
                        depth = 0;
                    }
                    _ => return Ok(false),
                },
            }
        }

        match continuation.parent {
            Some(parent) => {
                self.match_pattern(input, parent, depth.saturating_sub(1), derivation)
            }
            None => Ok(input.is_empty()),
        }
    }
}
