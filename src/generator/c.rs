//! C99 target. Patterns are NUL-terminated string literals, so a NUL symbol
//! cannot be expressed.

use std::fmt::{self, Write};

use super::{describe_rule, display_name, Backend};
use crate::config::EscapeMode;
use crate::grammar::Symbol;
use crate::plan::{rule_ident, Plan, Rule};
use crate::utils::{GrammarError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct CBackend;

fn push_escaped(out: &mut String, b: u8, quote: u8) {
    match b {
        b'\\' => out.push_str("\\\\"),
        b'?' => out.push_str("\\?"),
        _ if b == quote => {
            out.push('\\');
            out.push(b as char);
        }
        0x20..=0x7e => out.push(b as char),
        // Octal escapes always take three digits, so a following digit is
        // never swallowed the way a hex escape would swallow it.
        _ => {
            let _ = write!(out, "\\{:03o}", b);
        }
    }
}

/// Character literal for `symbol`, e.g. `'a'` or `'\\'`
fn char_literal(symbol: Symbol) -> String {
    let mut out = String::from("'");
    push_escaped(&mut out, symbol.value(), b'\'');
    out.push('\'');
    out
}

/// String literal for a pattern, e.g. `"aS"`
fn string_literal(pattern: &[u8]) -> String {
    let mut out = String::from("\"");
    for &b in pattern {
        push_escaped(&mut out, b, b'"');
    }
    out.push('"');
    out
}

impl Backend for CBackend {
    fn name(&self) -> &'static str {
        "c"
    }

    fn check_symbol(&self, symbol: Symbol) -> Result<()> {
        if symbol.value() == 0 {
            return Err(GrammarError::UnrepresentableSymbol {
                symbol,
                target: self.name(),
            });
        }
        Ok(())
    }

    fn write_prelude(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result {
        writeln!(
            out,
            "// Recognizer for grammar {}, generated by rd-gen.",
            display_name(plan)
        )?;
        writeln!(out, "// Usage: <program> <input>; prints accept or reject.")?;
        writeln!(out)?;
        writeln!(out, "#include <stdbool.h>")?;
        writeln!(out, "#include <stddef.h>")?;
        writeln!(out, "#include <stdio.h>")?;
        writeln!(out)?;
        writeln!(out, "#define ESCAPE {}", char_literal(plan.escape()))?;
        writeln!(out)?;
        writeln!(
            out,
            "// Pattern left at one nesting level, and what the enclosing level still needs."
        )?;
        writeln!(out, "struct continuation {{")?;
        writeln!(out, "    const char *pattern;")?;
        writeln!(out, "    const struct continuation *parent;")?;
        writeln!(out, "}};")?;
        writeln!(out)?;
        writeln!(
            out,
            "typedef bool (*rule_fn)(const char *input, const struct continuation *continuation);"
        )?;
        writeln!(out)?;
        for rule in plan.rules() {
            writeln!(
                out,
                "static bool match_{}(const char *input, const struct continuation *continuation);",
                rule.ident()
            )?;
        }
        writeln!(out, "static const rule_fn dispatch[256];")
    }

    fn write_matcher(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result {
        out.push_str(
            "static bool match_pattern(const char *input, const struct continuation *continuation)
{
    const char *pattern = continuation->pattern;

    while (*pattern) {
        char c = *pattern++;

",
        );

        match plan.escape_mode() {
            EscapeMode::Literal => out.push_str(
                "        if (c == ESCAPE) {
            if (!*pattern)
                break;
            c = *pattern++;
        } else if (c >= 'A' && c <= 'Z') {
            struct continuation next = { pattern, continuation->parent };
            rule_fn rule = dispatch[(unsigned char) c];
            return rule ? rule(input, &next) : false;
        }
",
            ),
            EscapeMode::Skip => out.push_str(
                "        if (c == ESCAPE)
            continue;

        if (c >= 'A' && c <= 'Z') {
            struct continuation next = { pattern, continuation->parent };
            rule_fn rule = dispatch[(unsigned char) c];
            return rule ? rule(input, &next) : false;
        }
",
            ),
        }

        out.push_str(
            "
        if (*input != c)
            return false;
        input++;
    }

    if (continuation->parent)
        return match_pattern(input, continuation->parent);

    return *input == '\\0';
}
",
        );
        Ok(())
    }

    fn write_rule(&self, out: &mut String, rule: &Rule<'_>, comments: bool) -> fmt::Result {
        if comments {
            writeln!(out, "// {}", describe_rule(rule))?;
        }
        writeln!(
            out,
            "static bool match_{}(const char *input, const struct continuation *continuation)",
            rule.ident()
        )?;
        writeln!(out, "{{")?;

        write!(out, "    static const char *const alternatives[] = {{ ")?;
        for rhs in rule.alternatives.iter() {
            write!(out, "{}, ", string_literal(rhs))?;
        }
        writeln!(out, "NULL }};")?;
        writeln!(out)?;
        writeln!(
            out,
            "    for (const char *const *alternative = alternatives; *alternative; alternative++) {{"
        )?;
        writeln!(
            out,
            "        struct continuation next = {{ *alternative, continuation }};"
        )?;
        writeln!(out, "        if (match_pattern(input, &next))")?;
        writeln!(out, "            return true;")?;
        writeln!(out, "    }}")?;
        writeln!(out)?;
        writeln!(out, "    return false;")?;
        writeln!(out, "}}")
    }

    fn write_dispatch(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result {
        writeln!(out, "static const rule_fn dispatch[256] = {{")?;
        for rule in plan.rules() {
            writeln!(
                out,
                "    [0x{:02x}] = match_{},",
                rule.symbol.value(),
                rule.ident()
            )?;
        }
        writeln!(out, "}};")
    }

    fn write_entry(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result {
        writeln!(out, "bool recognize(const char *input)")?;
        writeln!(out, "{{")?;
        writeln!(out, "    struct continuation outermost = {{ \"\", NULL }};")?;
        writeln!(
            out,
            "    return match_{}(input, &outermost);",
            rule_ident(plan.initial())
        )?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        out.push_str(
            "int main(int argc, char **argv)
{
    if (argc != 2) {
        fprintf(stderr, \"Usage:\\n\\t%s input\\n\", argv[0]);
        return 2;
    }

    if (recognize(argv[1])) {
        puts(\"accept\");
        return 0;
    }

    puts(\"reject\");
    return 1;
}
",
        );
        Ok(())
    }
}
