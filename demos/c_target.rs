use rd_gen::reader::parse_grammar;
use rd_gen::{Generator, GeneratorConfig, GrammarError, Target};
use std::error::Error;
use std::io;

const GRAMMAR: &str = r#"
# Palindromes over {a, b} with an escaped uppercase marker in the middle
Pal = (
    { P, }
    { a, b, M, }
    P,
    {
        P->aPa
        P->bPb
        P->\M
    }
)
"#;

/// Example of reading a grammar description and emitting a C recognizer
fn main() -> Result<(), Box<dyn Error>> {
    let grammar = parse_grammar(GRAMMAR)?;

    let config = GeneratorConfig::default().with_target(Target::C);
    let generator = Generator::new(config);

    // Build with `cc -std=c99 -o pal pal.c` and run `./pal abMba`
    let stdout = io::stdout();
    generator.generate(&grammar, &mut stdout.lock())?;

    // Referencing an undeclared non-terminal is caught before any output.
    let mut broken = grammar.clone();
    broken.add_alternative(b'P', b"aZa");
    match generator.generate_to_string(&broken) {
        Err(GrammarError::UndeclaredSymbolReference { symbol, lhs, alternative }) => eprintln!(
            "rejected: {} referenced by alternative {} of {}",
            symbol, alternative, lhs
        ),
        other => eprintln!("unexpected result: {:?}", other.map(|s| s.len())),
    }

    Ok(())
}
