//! Rust target. The emitted program needs only `std` and builds with a
//! plain `rustc recognizer.rs`.

use std::fmt::{self, Write};

use super::{describe_rule, display_name, Backend};
use crate::config::EscapeMode;
use crate::grammar::Symbol;
use crate::plan::{rule_ident, Plan, Rule};

#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

/// Byte literal for `symbol`, e.g. `b'a'` or `b'\\'`
fn byte_literal(symbol: Symbol) -> String {
    format!("b'{}'", symbol.value().escape_ascii())
}

/// Byte string literal for a pattern, e.g. `b"aS"`
fn byte_string(pattern: &[u8]) -> String {
    format!("b\"{}\"", pattern.escape_ascii())
}

impl Backend for RustBackend {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn write_prelude(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result {
        writeln!(
            out,
            "// Recognizer for grammar {}, generated by rd-gen.",
            display_name(plan)
        )?;
        writeln!(out, "// Usage: <program> <input>; prints accept or reject.")?;
        writeln!(out)?;
        writeln!(out, "#![allow(non_snake_case, dead_code)]")?;
        writeln!(out)?;
        writeln!(out, "use std::env;")?;
        writeln!(out, "use std::ffi::OsString;")?;
        writeln!(out, "use std::process::ExitCode;")?;
        writeln!(out)?;
        writeln!(
            out,
            "type Rule = fn(&[u8], &Continuation<'_>) -> bool;"
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "/// Pattern left at one nesting level, and what the enclosing level still needs."
        )?;
        writeln!(out, "struct Continuation<'a> {{")?;
        writeln!(out, "    pattern: &'a [u8],")?;
        writeln!(out, "    parent: Option<&'a Continuation<'a>>,")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "const ESCAPE: u8 = {};", byte_literal(plan.escape()))
    }

    fn write_matcher(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result {
        out.push_str(
            "fn match_pattern(mut input: &[u8], continuation: &Continuation<'_>) -> bool {
    let mut pattern = continuation.pattern;
    while let Some((&c, rest)) = pattern.split_first() {
        pattern = rest;
",
        );

        match plan.escape_mode() {
            EscapeMode::Literal => out.push_str(
                "        let c = if c == ESCAPE {
            match pattern.split_first() {
                Some((&literal, rest)) => {
                    pattern = rest;
                    literal
                }
                None => break,
            }
        } else if c.is_ascii_uppercase() {
            let next = Continuation {
                pattern,
                parent: continuation.parent,
            };
            return match DISPATCH[c as usize] {
                Some(rule) => rule(input, &next),
                None => false,
            };
        } else {
            c
        };
",
            ),
            EscapeMode::Skip => out.push_str(
                "        if c == ESCAPE {
            continue;
        }
        if c.is_ascii_uppercase() {
            let next = Continuation {
                pattern,
                parent: continuation.parent,
            };
            return match DISPATCH[c as usize] {
                Some(rule) => rule(input, &next),
                None => false,
            };
        }
",
            ),
        }

        out.push_str(
            "        match input.split_first() {
            Some((&head, tail)) if head == c => input = tail,
            _ => return false,
        }
    }

    match continuation.parent {
        Some(parent) => match_pattern(input, parent),
        None => input.is_empty(),
    }
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
            "fn match_{}(input: &[u8], continuation: &Continuation<'_>) -> bool {{",
            rule.ident()
        )?;

        write!(
            out,
            "    const ALTERNATIVES: [&[u8]; {}] = [",
            rule.alternatives.len()
        )?;
        for (i, rhs) in rule.alternatives.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&byte_string(rhs));
        }
        writeln!(out, "];")?;

        writeln!(out, "    for pattern in ALTERNATIVES {{")?;
        writeln!(out, "        let next = Continuation {{")?;
        writeln!(out, "            pattern,")?;
        writeln!(out, "            parent: Some(continuation),")?;
        writeln!(out, "        }};")?;
        writeln!(out, "        if match_pattern(input, &next) {{")?;
        writeln!(out, "            return true;")?;
        writeln!(out, "        }}")?;
        writeln!(out, "    }}")?;
        writeln!(out, "    false")?;
        writeln!(out, "}}")
    }

    fn write_dispatch(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result {
        writeln!(out, "const DISPATCH: [Option<Rule>; 256] = {{")?;
        writeln!(out, "    let mut table: [Option<Rule>; 256] = [None; 256];")?;
        for rule in plan.rules() {
            writeln!(
                out,
                "    table[{} as usize] = Some(match_{} as Rule);",
                byte_literal(rule.symbol),
                rule.ident()
            )?;
        }
        writeln!(out, "    table")?;
        writeln!(out, "}};")
    }

    fn write_entry(&self, out: &mut String, plan: &Plan<'_>) -> fmt::Result {
        writeln!(out, "fn recognize(input: &[u8]) -> bool {{")?;
        writeln!(out, "    let outermost = Continuation {{")?;
        writeln!(out, "        pattern: b\"\",")?;
        writeln!(out, "        parent: None,")?;
        writeln!(out, "    }};")?;
        writeln!(
            out,
            "    match_{}(input, &outermost)",
            rule_ident(plan.initial())
        )?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        out.push_str(
            "fn main() -> ExitCode {
    let args: Vec<OsString> = env::args_os().collect();
    if args.len() != 2 {
        let program = args
            .first()
            .map_or(\"recognizer\".into(), |program| program.to_string_lossy());
        eprintln!(\"Usage:\\n\\t{} input\", program);
        return ExitCode::from(2);
    }

    if recognize(args[1].as_encoded_bytes()) {
        println!(\"accept\");
        ExitCode::SUCCESS
    } else {
        println!(\"reject\");
        ExitCode::FAILURE
    }
}
",
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::emit;
    use crate::grammar::{Grammar, GrammarBuilder};
    use pretty_assertions::assert_eq;

    fn ab_grammar() -> Grammar {
        GrammarBuilder::new('S')
            .name("AB")
            .rule('S', "AB")
            .rule('A', "a")
            .rule('B', "b")
            .build()
    }

    #[test]
    fn test_literals() {
        assert_eq!(byte_literal(Symbol(b'S')), "b'S'");
        assert_eq!(byte_literal(Symbol(b'\\')), "b'\\\\'");
        assert_eq!(byte_literal(Symbol(b'\'')), "b'\\''");
        assert_eq!(byte_string(b"a\"\\"), "b\"a\\\"\\\\\"");
        assert_eq!(byte_string(&[0x00, b'x']), "b\"\\x00x\"");
    }

    #[test]
    fn test_rule_routine() {
        let grammar = GrammarBuilder::new('S').rule('S', "aS").rule('S', "").build();
        let plan = Plan::build(&grammar, EscapeMode::Literal).unwrap();

        let mut out = String::new();
        RustBackend
            .write_rule(&mut out, &plan.rules()[0], true)
            .unwrap();
        assert_eq!(
            out,
            r#"// S: "aS" | ""
fn match_S(input: &[u8], continuation: &Continuation<'_>) -> bool {
    const ALTERNATIVES: [&[u8]; 2] = [b"aS", b""];
    for pattern in ALTERNATIVES {
        let next = Continuation {
            pattern,
            parent: Some(continuation),
        };
        if match_pattern(input, &next) {
            return true;
        }
    }
    false
}
"#
        );
    }

    #[test]
    fn test_dispatch_table_covers_declared_rules() {
        let grammar = ab_grammar();
        let plan = Plan::build(&grammar, EscapeMode::Literal).unwrap();

        let mut out = String::new();
        RustBackend.write_dispatch(&mut out, &plan).unwrap();
        assert_eq!(
            out,
            "const DISPATCH: [Option<Rule>; 256] = {
    let mut table: [Option<Rule>; 256] = [None; 256];
    table[b'S' as usize] = Some(match_S as Rule);
    table[b'A' as usize] = Some(match_A as Rule);
    table[b'B' as usize] = Some(match_B as Rule);
    table
};
"
        );
    }

    #[test]
    fn test_entry_starts_at_initial() {
        let mut grammar = ab_grammar();
        grammar.set_initial(b'B');
        let plan = Plan::build(&grammar, EscapeMode::Literal).unwrap();

        let source = emit(&RustBackend, &plan, false).unwrap();
        assert!(source.contains("    match_B(input, &outermost)\n"));
        assert!(source.contains("env::args_os()"));
        assert!(source.contains("recognize(args[1].as_encoded_bytes())"));
        assert!(source.starts_with("// Recognizer for grammar AB, generated by rd-gen.\n"));
        assert!(!source.contains("// S:"));
    }

    #[test]
    fn test_skip_matcher_has_no_literal_escape() {
        let grammar = ab_grammar();
        let plan = Plan::build(&grammar, EscapeMode::Skip).unwrap();

        let mut out = String::new();
        RustBackend.write_matcher(&mut out, &plan).unwrap();
        assert!(out.contains("        if c == ESCAPE {\n            continue;\n        }\n"));
        assert!(!out.contains("literal"));
    }
}
