//! Random sentence generation.
//!
//! Picks alternatives at random to produce strings derivable from the start
//! symbol. Useful for exercising a generated recognizer: every sampled
//! sentence must be accepted.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grammar::Symbol;
use crate::plan::{Plan, Step};
use crate::utils::{GrammarError, OptionExt, Result};

/// Default maximum expansion depth for a single draw
pub const DEFAULT_SAMPLE_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub struct Sampler<'p, 'g> {
    plan: &'p Plan<'g>,
    max_depth: usize,
}

impl<'p, 'g> Sampler<'p, 'g> {
    pub fn new(plan: &'p Plan<'g>) -> Self {
        Sampler {
            plan,
            max_depth: DEFAULT_SAMPLE_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Draw one sentence; fails with `DepthExceeded` if the draw nests too deep
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.expand(self.plan.initial(), 0, rng, &mut out)?;
        Ok(out)
    }

    /// Draw `count` sentences, retrying draws that nest too deep.
    ///
    /// Gives up with `DepthExceeded` after `attempts` consecutive failures,
    /// which happens for grammars whose start symbol derives no finite string.
    pub fn sample_many<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
        attempts: usize,
    ) -> Result<Vec<Vec<u8>>> {
        let mut sentences = Vec::with_capacity(count);
        let mut failures = 0;
        while sentences.len() < count {
            match self.sample(rng) {
                Ok(sentence) => {
                    sentences.push(sentence);
                    failures = 0;
                }
                Err(GrammarError::DepthExceeded(depth)) => {
                    failures += 1;
                    if failures >= attempts {
                        return Err(GrammarError::DepthExceeded(depth));
                    }
                }
                Err(err) => return Err(err),
            }
        }
        Ok(sentences)
    }

    fn expand<R: Rng + ?Sized>(
        &self,
        symbol: Symbol,
        depth: usize,
        rng: &mut R,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        if depth >= self.max_depth {
            return Err(GrammarError::DepthExceeded(self.max_depth));
        }

        let rule = self
            .plan
            .dispatch(symbol)
            .ok_or_grammar_err(|| format!("{} has no rule", symbol))?;
        let rhs = rule
            .alternatives
            .rights()
            .choose(rng)
            .ok_or_grammar_err(|| format!("{} has no alternatives", symbol))?;

        for step in self.plan.steps(rhs) {
            match step {
                Step::Literal(b) => out.push(b),
                Step::Call(callee) => self.expand(callee, depth + 1, rng, out)?,
            }
        }
        Ok(())
    }
}
