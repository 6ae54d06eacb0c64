use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rd_gen::reader::read_grammar_file;
use rd_gen::sample::DEFAULT_SAMPLE_DEPTH;
use rd_gen::{EscapeMode, Generator, GeneratorConfig, Grammar, Recognizer, Sampler, Target};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

/// Backtracking recursive-descent recognizer generator
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Suppress status messages on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit a standalone recognizer program for a grammar
    Generate {
        /// Path to the grammar file
        grammar_file: PathBuf,

        /// Output file path (stdout when omitted)
        output: Option<PathBuf>,

        #[command(flatten)]
        options: GeneratorOptions,
    },

    /// Print a grammar back in its own notation
    Print {
        /// Path to the grammar file
        grammar_file: PathBuf,
    },

    /// Run the recognizer in-process against one or more inputs
    Check {
        /// Path to the grammar file
        grammar_file: PathBuf,

        /// Strings to recognize
        #[arg(required = true)]
        inputs: Vec<String>,

        #[command(flatten)]
        options: GeneratorOptions,
    },

    /// Print random sentences derivable from the start symbol
    Sample {
        /// Path to the grammar file
        grammar_file: PathBuf,

        /// Number of sentences to generate
        #[arg(default_value = "1")]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum expansion depth per sentence
        #[arg(long, default_value_t = DEFAULT_SAMPLE_DEPTH)]
        max_depth: usize,

        #[command(flatten)]
        options: GeneratorOptions,
    },
}

#[derive(Args)]
struct GeneratorOptions {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Language of the emitted recognizer
    #[arg(long, value_enum)]
    target: Option<Target>,

    /// How an escape marker affects the symbol after it
    #[arg(long, value_enum)]
    escape_mode: Option<EscapeMode>,
}

impl GeneratorOptions {
    fn resolve(&self) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_json_file(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(escape_mode) = self.escape_mode {
            config.escape_mode = escape_mode;
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Generate {
            grammar_file,
            output,
            options,
        } => {
            let config = options.resolve()?;
            let grammar = load_grammar(&grammar_file, quiet)?;
            let generator = Generator::new(config);

            match output {
                Some(path) => {
                    // Generate before creating the file so a failed run leaves no output behind
                    let source = generator.generate_to_string(&grammar)?;
                    std::fs::write(&path, source)?;
                    if !quiet {
                        eprintln!(
                            "Wrote {} recognizer to {}",
                            generator.config().target,
                            path.display()
                        );
                    }
                }
                None => {
                    let stdout = io::stdout();
                    let mut sink = BufWriter::new(stdout.lock());
                    generator.generate(&grammar, &mut sink)?;
                }
            }
        }
        Commands::Print { grammar_file } => {
            let grammar = load_grammar(&grammar_file, quiet)?;
            print!("{}", grammar);
        }
        Commands::Check {
            grammar_file,
            inputs,
            options,
        } => {
            let config = options.resolve()?;
            let grammar = load_grammar(&grammar_file, quiet)?;
            let recognizer = Recognizer::new(&grammar, &config)?;

            let mut rejected = 0;
            for input in &inputs {
                let accepted = recognizer.recognize(input.as_bytes())?;
                if !accepted {
                    rejected += 1;
                }
                println!("{}\t{}", if accepted { "accept" } else { "reject" }, input);
            }
            if rejected > 0 {
                return Err(format!("{} of {} inputs rejected", rejected, inputs.len()).into());
            }
        }
        Commands::Sample {
            grammar_file,
            count,
            seed,
            max_depth,
            options,
        } => {
            let config = options.resolve()?;
            let grammar = load_grammar(&grammar_file, quiet)?;
            let recognizer = Recognizer::new(&grammar, &config)?;

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            if !quiet {
                eprintln!("Generating {} random samples:\n", count);
            }
            let sampler = Sampler::new(recognizer.plan()).with_max_depth(max_depth);
            for (i, sentence) in sampler.sample_many(&mut rng, count, 100)?.iter().enumerate() {
                println!("{}. {}", i + 1, String::from_utf8_lossy(sentence));
            }
        }
    }

    Ok(())
}

fn load_grammar(path: &Path, quiet: bool) -> Result<Grammar, Box<dyn std::error::Error>> {
    if !quiet {
        eprintln!("Loading grammar from {}...", path.display());
    }
    let grammar = read_grammar_file(path)?;
    if !quiet {
        eprintln!(
            "Loaded {} non-terminals, {} terminals, {} alternatives.",
            grammar.non_terminals().len(),
            grammar.terminals().len(),
            grammar.alternative_count()
        );
    }
    Ok(grammar)
}
