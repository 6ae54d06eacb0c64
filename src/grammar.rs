use std::collections::TryReserveError;
use std::fmt;

use crate::utils::memory_error;

/// Number of distinct symbol values; the production table has one slot per value
pub const SYMBOL_COUNT: usize = 0x100;

/// Escape marker used unless the grammar overrides it
pub const DEFAULT_ESCAPE: u8 = b'\\';

/// A single grammar symbol
///
/// Symbols are plain byte values. Whether a symbol is a terminal or a
/// non-terminal is decided by its value, see [`Grammar::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(pub u8);

impl Symbol {
    /// The raw byte value
    pub fn value(self) -> u8 {
        self.0
    }

    /// Index of this symbol in a 256-entry table
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Uppercase ASCII letters name non-terminals
    pub fn is_non_terminal(self) -> bool {
        self.0.is_ascii_uppercase()
    }
}

impl From<u8> for Symbol {
    fn from(value: u8) -> Self {
        Symbol(value)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_ascii_graphic() {
            write!(f, "{}", self.0 as char)
        } else {
            write!(f, "\\x{:02x}", self.0)
        }
    }
}

/// Spelling of a symbol inside the printed notation: the character itself,
/// or `\xNN` for whitespace, non-printing bytes and the notation's own
/// punctuation
pub fn encode_symbol(symbol: Symbol) -> String {
    match symbol.0 {
        b',' | b'{' | b'}' | b'(' | b')' | b'\\' | b'#' | b'=' => format!("\\x{:02x}", symbol.0),
        _ => symbol.to_string(),
    }
}

/// Inverse of [`encode_symbol`]
pub fn decode_symbol(token: &str) -> Option<Symbol> {
    match token.as_bytes() {
        [b] => Some(Symbol(*b)),
        [b'\\', b'x', hi, lo] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
            let hex = format!("{}{}", *hi as char, *lo as char);
            u8::from_str_radix(&hex, 16).ok().map(Symbol)
        }
        _ => None,
    }
}

/// Classification of a symbol appearing in a right-hand side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Matched literally against one input byte
    Terminal,
    /// Expanded through one of its alternatives
    NonTerminal,
    /// The grammar's escape marker
    Escape,
}

/// The ordered right-hand sides declared for one non-terminal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alternatives {
    rights: Vec<Vec<u8>>,
}

impl Alternatives {
    /// Right-hand sides in declaration order
    pub fn rights(&self) -> &[Vec<u8>] {
        &self.rights
    }

    pub fn len(&self) -> usize {
        self.rights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.rights.iter().map(Vec::as_slice)
    }

    /// Append `right` into capacity reserved beforehand and return its slot
    fn push_reserved(&mut self, right: Vec<u8>) -> &mut Vec<u8> {
        self.rights.push(right);
        let last = self.rights.len() - 1;
        &mut self.rights[last]
    }
}

/// A context-free grammar over single-byte symbols
///
/// Built once by a front-end (see [`crate::reader`] or [`GrammarBuilder`]),
/// then only read by the generator and recognizer.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: Option<String>,
    terminals: Vec<Symbol>,
    non_terminals: Vec<Symbol>,
    initial: Option<Symbol>,
    escape: Symbol,
    productions: Vec<Alternatives>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    /// Create an empty grammar with an all-empty production table
    pub fn new() -> Self {
        let mut productions = Vec::new();
        if productions.try_reserve_exact(SYMBOL_COUNT).is_err() {
            memory_error();
        }
        productions.resize_with(SYMBOL_COUNT, Alternatives::default);

        Grammar {
            name: None,
            terminals: Vec::new(),
            non_terminals: Vec::new(),
            initial: None,
            escape: Symbol(DEFAULT_ESCAPE),
            productions,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn set_initial(&mut self, initial: impl Into<Symbol>) {
        self.initial = Some(initial.into());
    }

    pub fn set_escape(&mut self, escape: impl Into<Symbol>) {
        self.escape = escape.into();
    }

    /// Add a terminal to the alphabet. Returns false if it was already present.
    pub fn declare_terminal(&mut self, symbol: impl Into<Symbol>) -> bool {
        match insert_ordered(&mut self.terminals, symbol.into()) {
            Ok(added) => added,
            Err(_) => self.abandon(),
        }
    }

    /// Add a non-terminal to the alphabet. Returns false if it was already present.
    pub fn declare_non_terminal(&mut self, symbol: impl Into<Symbol>) -> bool {
        match insert_ordered(&mut self.non_terminals, symbol.into()) {
            Ok(added) => added,
            Err(_) => self.abandon(),
        }
    }

    /// Append a right-hand side to `lhs` and return its slot.
    ///
    /// Front-ends that scan a right-hand side incrementally keep pushing into
    /// the returned buffer. Identical alternatives are not merged.
    pub fn add_alternative(&mut self, lhs: impl Into<Symbol>, rhs: &[u8]) -> &mut Vec<u8> {
        let index = lhs.into().index();
        let mut right = Vec::new();
        if right.try_reserve_exact(rhs.len()).is_err()
            || self.productions[index].rights.try_reserve(1).is_err()
        {
            drop(right);
            self.abandon();
        }
        right.extend_from_slice(rhs);
        self.productions[index].push_reserved(right)
    }

    /// Release every declaration and alternative, keeping the empty
    /// production table
    pub fn clear(&mut self) {
        self.name = None;
        self.terminals = Vec::new();
        self.non_terminals = Vec::new();
        self.initial = None;
        self.escape = Symbol(DEFAULT_ESCAPE);
        for alternatives in &mut self.productions {
            *alternatives = Alternatives::default();
        }
    }

    /// Storage ran out mid-construction: release the partial grammar and
    /// take the fatal path.
    fn abandon(&mut self) -> ! {
        self.clear();
        memory_error()
    }

    /// Append an empty right-hand side to `lhs` and return its slot
    pub fn new_alternative(&mut self, lhs: impl Into<Symbol>) -> &mut Vec<u8> {
        self.add_alternative(lhs, &[])
    }

    /// Classify a symbol using this grammar's escape marker
    pub fn classify(&self, symbol: impl Into<Symbol>) -> SymbolKind {
        let symbol = symbol.into();
        if symbol == self.escape {
            SymbolKind::Escape
        } else if symbol.is_non_terminal() {
            SymbolKind::NonTerminal
        } else {
            SymbolKind::Terminal
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn terminals(&self) -> &[Symbol] {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &[Symbol] {
        &self.non_terminals
    }

    pub fn initial(&self) -> Option<Symbol> {
        self.initial
    }

    pub fn escape(&self) -> Symbol {
        self.escape
    }

    pub fn is_declared_non_terminal(&self, symbol: Symbol) -> bool {
        self.non_terminals.contains(&symbol)
    }

    /// Alternatives for any symbol value; empty for symbols without productions
    pub fn alternatives(&self, symbol: impl Into<Symbol>) -> &Alternatives {
        &self.productions[symbol.into().index()]
    }

    /// Every symbol with at least one alternative, paired with its list
    pub fn productions(&self) -> impl Iterator<Item = (Symbol, &Alternatives)> {
        self.productions
            .iter()
            .enumerate()
            .filter(|(_, alts)| !alts.is_empty())
            .map(|(value, alts)| (Symbol(value as u8), alts))
    }

    /// Total number of right-hand sides across all symbols
    pub fn alternative_count(&self) -> usize {
        self.productions.iter().map(Alternatives::len).sum()
    }
}

fn insert_ordered(
    set: &mut Vec<Symbol>,
    symbol: Symbol,
) -> std::result::Result<bool, TryReserveError> {
    if set.contains(&symbol) {
        return Ok(false);
    }
    set.try_reserve(1)?;
    set.push(symbol);
    Ok(true)
}

/// Prints the grammar in the tool's notation, readable by [`crate::reader`]
impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} = (", self.name.as_deref().unwrap_or(""))?;

        write!(f, "\t{{")?;
        for &symbol in &self.non_terminals {
            write!(f, " {},", encode_symbol(symbol))?;
        }
        writeln!(f, " }}")?;

        write!(f, "\t{{")?;
        for &symbol in &self.terminals {
            write!(f, " {},", encode_symbol(symbol))?;
        }
        writeln!(f, " }}")?;

        match self.initial {
            Some(initial) => writeln!(f, "\t{},", encode_symbol(initial))?,
            None => writeln!(f, "\t,")?,
        }

        writeln!(f, "\t{{")?;
        for (lhs, alternatives) in self.productions() {
            for rhs in alternatives.iter() {
                writeln!(
                    f,
                    "\t\t{}->{}",
                    encode_symbol(lhs),
                    String::from_utf8_lossy(rhs)
                )?;
            }
        }
        writeln!(f, "\t}}")?;
        writeln!(f, ")")
    }
}

/// Builder for constructing Grammar instances
pub struct GrammarBuilder {
    grammar: Grammar,
}

impl GrammarBuilder {
    /// Create a new grammar builder with the given start symbol
    pub fn new(initial: char) -> Self {
        let mut grammar = Grammar::new();
        grammar.set_initial(initial as u8);
        GrammarBuilder { grammar }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.grammar.set_name(name);
        self
    }

    pub fn escape(mut self, escape: char) -> Self {
        self.grammar.set_escape(escape as u8);
        self
    }

    /// Declare every byte of `symbols` as a non-terminal
    pub fn non_terminals(mut self, symbols: &str) -> Self {
        for &b in symbols.as_bytes() {
            self.grammar.declare_non_terminal(b);
        }
        self
    }

    /// Declare every byte of `symbols` as a terminal
    pub fn terminals(mut self, symbols: &str) -> Self {
        for &b in symbols.as_bytes() {
            self.grammar.declare_terminal(b);
        }
        self
    }

    /// Add an alternative `lhs -> rhs`.
    ///
    /// `lhs` is declared as a non-terminal and the terminals of `rhs` are
    /// declared in discovery order. Non-terminals referenced by `rhs` are
    /// left undeclared; declare them with their own rules.
    pub fn rule(mut self, lhs: char, rhs: &str) -> Self {
        self.grammar.declare_non_terminal(lhs as u8);
        let mut escaped = false;
        for &b in rhs.as_bytes() {
            let kind = self.grammar.classify(b);
            if escaped || kind == SymbolKind::Terminal {
                self.grammar.declare_terminal(b);
                escaped = false;
            } else if kind == SymbolKind::Escape {
                escaped = true;
            }
        }
        self.grammar.add_alternative(lhs as u8, rhs.as_bytes());
        self
    }

    /// Build the grammar
    pub fn build(self) -> Grammar {
        self.grammar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_grammar_is_empty() {
        let grammar = Grammar::new();
        assert!(grammar.terminals().is_empty());
        assert!(grammar.non_terminals().is_empty());
        assert_eq!(grammar.initial(), None);
        assert_eq!(grammar.alternative_count(), 0);
        assert!(grammar.alternatives(b'S').is_empty());
        assert!(grammar.alternatives(0xffu8).is_empty());
    }

    #[test]
    fn test_alternatives_keep_declaration_order() {
        let mut grammar = Grammar::new();
        grammar.add_alternative(b'S', b"aS");
        grammar.add_alternative(b'S', b"");
        grammar.add_alternative(b'S', b"aS");

        let rights: Vec<&[u8]> = grammar.alternatives(b'S').iter().collect();
        assert_eq!(rights, vec![&b"aS"[..], &b""[..], &b"aS"[..]]);
    }

    #[test]
    fn test_slot_filled_incrementally() {
        let mut grammar = Grammar::new();
        {
            let slot = grammar.new_alternative(b'A');
            slot.push(b'x');
            slot.push(b'B');
        }
        assert_eq!(grammar.alternatives(b'A').rights(), &[b"xB".to_vec()]);
    }

    #[test]
    fn test_declarations_are_ordered_sets() {
        let mut grammar = Grammar::new();
        assert!(grammar.declare_non_terminal(b'S'));
        assert!(grammar.declare_non_terminal(b'A'));
        assert!(!grammar.declare_non_terminal(b'S'));
        assert_eq!(grammar.non_terminals(), &[Symbol(b'S'), Symbol(b'A')]);
    }

    #[test]
    fn test_clear_releases_partial_grammar() {
        let mut grammar = GrammarBuilder::new('S')
            .name("partial")
            .escape('!')
            .rule('S', "aS")
            .rule('S', "")
            .build();

        grammar.clear();
        assert_eq!(grammar.name(), None);
        assert_eq!(grammar.initial(), None);
        assert_eq!(grammar.escape(), Symbol(DEFAULT_ESCAPE));
        assert!(grammar.terminals().is_empty());
        assert!(grammar.non_terminals().is_empty());
        assert_eq!(grammar.alternative_count(), 0);
        assert!(grammar.alternatives(b'S').is_empty());

        grammar.add_alternative(b'S', b"b");
        assert_eq!(grammar.alternative_count(), 1);
    }

    #[test]
    fn test_classify() {
        let grammar = Grammar::new();
        assert_eq!(grammar.classify(b'a'), SymbolKind::Terminal);
        assert_eq!(grammar.classify(b'('), SymbolKind::Terminal);
        assert_eq!(grammar.classify(b'Q'), SymbolKind::NonTerminal);
        assert_eq!(grammar.classify(b'\\'), SymbolKind::Escape);

        let mut grammar = Grammar::new();
        grammar.set_escape(b'%');
        assert_eq!(grammar.classify(b'\\'), SymbolKind::Terminal);
        assert_eq!(grammar.classify(b'%'), SymbolKind::Escape);
    }

    #[test]
    fn test_builder_discovers_terminals() {
        let grammar = GrammarBuilder::new('S')
            .name("G")
            .rule('S', "aAb")
            .rule('A', "c\\Bd")
            .build();

        assert_eq!(grammar.name(), Some("G"));
        assert_eq!(grammar.non_terminals(), &[Symbol(b'S'), Symbol(b'A')]);
        assert_eq!(
            grammar.terminals(),
            &[Symbol(b'a'), Symbol(b'b'), Symbol(b'c'), Symbol(b'B'), Symbol(b'd')]
        );
    }

    #[test]
    fn test_display() {
        let grammar = GrammarBuilder::new('S')
            .name("G")
            .rule('S', "aS")
            .rule('S', "")
            .build();

        assert_eq!(
            grammar.to_string(),
            "G = (\n\t{ S, }\n\t{ a, }\n\tS,\n\t{\n\t\tS->aS\n\t\tS->\n\t}\n)\n"
        );
    }

    #[test]
    fn test_encode_symbol() {
        assert_eq!(encode_symbol(Symbol(b'a')), "a");
        assert_eq!(encode_symbol(Symbol(b',')), "\\x2c");
        assert_eq!(encode_symbol(Symbol(b'\\')), "\\x5c");
        assert_eq!(decode_symbol("\\x2c"), Some(Symbol(b',')));
        assert_eq!(decode_symbol("\\x7D"), Some(Symbol(b'}')));
        assert_eq!(decode_symbol("b"), Some(Symbol(b'b')));
        assert_eq!(decode_symbol("ab"), None);
        assert_eq!(decode_symbol("\\xzz"), None);
    }

    #[test]
    fn test_symbol_display() {
        assert_eq!(Symbol(b'x').to_string(), "x");
        assert_eq!(Symbol(b' ').to_string(), "\\x20");
        assert_eq!(Symbol(0).to_string(), "\\x00");
    }
}
