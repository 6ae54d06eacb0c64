use rand::rngs::StdRng;
use rand::SeedableRng;
use rd_gen::{Generator, GeneratorConfig, GrammarBuilder, Recognizer, Sampler};
use std::error::Error;

/// Example of building a grammar programmatically, checking inputs in-process
/// and emitting a standalone Rust recognizer for it
fn main() -> Result<(), Box<dyn Error>> {
    // Arithmetic over `x` with + and *, no left recursion:
    //   E -> T R      R -> + T R | ε
    //   T -> F Q      Q -> * F Q | ε
    //   F -> ( E ) | x
    let grammar = GrammarBuilder::new('E')
        .name("arith")
        .rule('E', "TR")
        .rule('R', "+TR")
        .rule('R', "")
        .rule('T', "FQ")
        .rule('Q', "*FQ")
        .rule('Q', "")
        .rule('F', "(E)")
        .rule('F', "x")
        .build();

    println!("{}", grammar);

    let config = GeneratorConfig::default();
    let recognizer = Recognizer::new(&grammar, &config)?;

    println!("In-process recognition:");
    for input in ["x", "x+x*x", "(x+x)*x", "x+", "(x", "xx"] {
        let verdict = if recognizer.recognize(input.as_bytes())? {
            "accept"
        } else {
            "reject"
        };
        println!("  {:<10} {}", input, verdict);
    }

    println!("\nRandom sentences:");
    let mut rng = StdRng::seed_from_u64(11);
    let sampler = Sampler::new(recognizer.plan()).with_max_depth(8);
    for (i, sentence) in sampler.sample_many(&mut rng, 5, 100)?.iter().enumerate() {
        println!("  {}. {}", i + 1, String::from_utf8_lossy(sentence));
    }

    println!("\nGenerated recognizer:\n");
    let source = Generator::new(config).generate_to_string(&grammar)?;
    println!("{}", source);

    Ok(())
}
