//! CLI for wordformer: demo, generate, info, encode, decode, save, bench.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use wordformer::{
    build_model, create_demo_model_seeded, demo_config, GenerationConfig, GenerationToken,
    ModelConfig, ModelHandle, Vocabulary, BOS_ID,
};

#[derive(Parser)]
#[command(name = "wordformer")]
#[command(about = "Word-level transformer language model inference")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the model and vocabulary come from.
#[derive(Args)]
struct ModelArgs {
    /// JSON model config; missing fields take defaults
    #[arg(long, conflicts_with = "checkpoint")]
    config: Option<PathBuf>,
    /// JSON checkpoint written by `save`
    #[arg(long)]
    checkpoint: Option<PathBuf>,
    /// JSON vocabulary; defaults to the built-in word lists
    #[arg(long)]
    vocab: Option<PathBuf>,
    /// Seed for weight initialization and sampling
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a seeded demo model, run a forward pass and generate
    Demo {
        #[arg(long, default_value = "42")]
        seed: u64,
        #[arg(long, default_value = "the neural network")]
        prompt: String,
    },

    /// Generate a continuation of a prompt
    Generate {
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long)]
        prompt: String,
        #[arg(long, default_value = "50")]
        max_length: usize,
        #[arg(long, default_value = "0.7")]
        temperature: f64,
        #[arg(long, default_value = "40")]
        top_k: usize,
        #[arg(long, default_value = "1.0")]
        repetition_penalty: f64,
        /// Recompute the full prefix every step instead of using the KV cache
        #[arg(long)]
        no_cache: bool,
        /// Print tokens as they are sampled
        #[arg(long)]
        stream: bool,
    },

    /// Print the architecture and vocabulary statistics as JSON
    Info {
        #[command(flatten)]
        model: ModelArgs,
    },

    /// Print the token ids of a text
    Encode {
        #[arg(long)]
        text: String,
        #[arg(long)]
        vocab: Option<PathBuf>,
    },

    /// Print the text of token ids
    Decode {
        ids: Vec<usize>,
        #[arg(long)]
        vocab: Option<PathBuf>,
    },

    /// Write a model checkpoint (and optionally the vocabulary)
    Save {
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        vocab_output: Option<PathBuf>,
    },

    /// Measure forward-pass latency
    Bench {
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long, default_value = "20")]
        iterations: usize,
        #[arg(long, default_value = "16")]
        tokens: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo { seed, prompt } => run_demo(seed, &prompt)?,
        Commands::Generate {
            model,
            prompt,
            max_length,
            temperature,
            top_k,
            repetition_penalty,
            no_cache,
            stream,
        } => {
            let config = GenerationConfig {
                max_length,
                temperature,
                top_k,
                seed: model.seed,
                repetition_penalty,
                use_cache: !no_cache,
                ..Default::default()
            };
            run_generate(&model, &prompt, &config, stream)?
        }
        Commands::Info { model } => run_info(&model)?,
        Commands::Encode { text, vocab } => {
            let vocab = load_vocab(vocab.as_deref())?;
            println!("{:?}", vocab.encode(&text));
        }
        Commands::Decode { ids, vocab } => {
            let vocab = load_vocab(vocab.as_deref())?;
            println!("{}", vocab.decode(&ids));
        }
        Commands::Save {
            model,
            output,
            vocab_output,
        } => run_save(&model, &output, vocab_output.as_deref())?,
        Commands::Bench {
            model,
            iterations,
            tokens,
        } => run_bench(&model, iterations, tokens)?,
    }
    Ok(())
}

fn load_vocab(path: Option<&Path>) -> Result<Vocabulary> {
    match path {
        Some(path) => Vocabulary::load(path)
            .with_context(|| format!("loading vocabulary from {}", path.display())),
        None => Ok(Vocabulary::seeded()),
    }
}

/// Checkpoint if given, else a fresh build of `--config` (or the demo config
/// sized to the vocabulary).
fn load_model(args: &ModelArgs, vocab: &Vocabulary) -> Result<ModelHandle> {
    if let Some(path) = &args.checkpoint {
        info!("Loading checkpoint from {:?}...", path);
        return ModelHandle::load(path)
            .with_context(|| format!("loading checkpoint from {}", path.display()));
    }
    let config = match &args.config {
        Some(path) => ModelConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => demo_config(vocab.len()),
    };
    if config.vocabulary_size < vocab.len() {
        info!(
            "Model vocabulary ({}) is smaller than the tokenizer's ({}); larger ids are clamped",
            config.vocabulary_size,
            vocab.len()
        );
    }
    Ok(build_model(config, args.seed)?)
}

/// BOS followed by the encoded prompt.
fn prompt_ids(vocab: &Vocabulary, prompt: &str) -> Vec<usize> {
    std::iter::once(BOS_ID).chain(vocab.encode(prompt)).collect()
}

fn run_demo(seed: u64, prompt: &str) -> Result<()> {
    let vocab = Vocabulary::seeded();
    info!("Creating demo model (seed {})...", seed);
    let handle = create_demo_model_seeded(vocab.len(), seed)?;
    let engine = handle.engine()?;

    let ids = prompt_ids(&vocab, prompt);
    info!("Running forward pass on {} tokens...", ids.len());
    let t0 = Instant::now();
    let out = engine.forward(&ids)?;
    info!(
        "Forward pass: {:?}, logits len = {}",
        t0.elapsed(),
        out.logits.len()
    );
    let best = wordformer::argmax(&out.probabilities).unwrap_or(0);
    info!(
        "Most likely next token: {:?} (p = {:.4})",
        vocab.token(best).unwrap_or("?"),
        out.probabilities[best]
    );

    let config = GenerationConfig {
        max_length: 12,
        seed: Some(seed),
        ..Default::default()
    };
    let result = handle.generator()?.generate_with_details(&ids, &config)?;
    info!(
        "Generated {} tokens ({}): {}",
        result.new_tokens().len(),
        result.stop_reason,
        vocab.decode(result.new_tokens())
    );
    Ok(())
}

fn run_generate(args: &ModelArgs, prompt: &str, config: &GenerationConfig, stream: bool) -> Result<()> {
    let vocab = load_vocab(args.vocab.as_deref())?;
    let handle = load_model(args, &vocab)?;
    let generator = handle.generator()?;
    let ids = prompt_ids(&vocab, prompt);
    info!("Prompt token count: {}", ids.len());

    let result = generator.generate_streaming(&ids, config, |event| {
        if let (true, GenerationToken::Token { id, .. }) = (stream, event) {
            print!("{} ", vocab.decode(&[*id]));
        }
        ControlFlow::Continue(())
    })?;
    if stream {
        println!();
    }
    println!("Generated: {}", vocab.decode(result.new_tokens()));
    info!(
        "Stopped ({}) after {} tokens in {:.1} ms",
        result.stop_reason,
        result.new_tokens().len(),
        result.time_ms
    );
    Ok(())
}

fn run_info(args: &ModelArgs) -> Result<()> {
    let vocab = load_vocab(args.vocab.as_deref())?;
    let handle = load_model(args, &vocab)?;
    let report = serde_json::json!({
        "architecture": handle.architecture(),
        "vocabulary": vocab.stats(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_save(args: &ModelArgs, output: &Path, vocab_output: Option<&Path>) -> Result<()> {
    let vocab = load_vocab(args.vocab.as_deref())?;
    let handle = load_model(args, &vocab)?;
    handle.save(output)?;
    if let Some(path) = vocab_output {
        vocab.save(path)?;
    }
    Ok(())
}

fn run_bench(args: &ModelArgs, iterations: usize, tokens: usize) -> Result<()> {
    let vocab = load_vocab(args.vocab.as_deref())?;
    let handle = load_model(args, &vocab)?;
    let engine = handle.engine()?;
    let len = tokens.clamp(1, engine.max_sequence_length());
    let input: Vec<usize> = (0..len).map(|i| i % engine.vocab_size()).collect();
    let iterations = iterations.max(1);
    let warmup = 3;
    for _ in 0..warmup {
        let _ = engine.forward_last(&input)?;
    }
    let t0 = Instant::now();
    for _ in 0..iterations {
        let _ = engine.forward_last(&input)?;
    }
    let per_pass = t0.elapsed().as_secs_f64() / iterations as f64 * 1000.0;
    println!(
        "Forward pass: {:.3} ms ({} tokens, {} iters, {} parameters)",
        per_pass,
        len,
        iterations,
        handle.parameter_count()
    );
    Ok(())
}
