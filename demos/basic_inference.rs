//! Basic inference example: build a seeded demo model, run a forward pass and
//! generate a short continuation.

use wordformer::{create_demo_model_seeded, GenerationConfig, Vocabulary, BOS_ID};

fn main() -> anyhow::Result<()> {
    let vocab = Vocabulary::seeded();
    println!("Vocabulary: {} tokens", vocab.len());

    let handle = create_demo_model_seeded(vocab.len(), 42)?;
    println!(
        "Model: {} parameters ({:.2} MB)",
        handle.parameter_count(),
        handle.memory_estimate_mb()
    );

    let mut ids = vec![BOS_ID];
    ids.extend(vocab.encode("in other words the model"));
    println!("Forward pass on token ids {:?}", ids);
    let out = handle.engine()?.forward(&ids)?;
    let best = wordformer::argmax(&out.logits).unwrap_or(0);
    println!("Most likely next token: {:?}", vocab.token(best));

    let config = GenerationConfig {
        max_length: 8,
        seed: Some(42),
        ..Default::default()
    };
    let result = handle.generator()?.generate_with_details(&ids, &config)?;
    println!(
        "Generated ({}): {}",
        result.stop_reason,
        vocab.decode(result.new_tokens())
    );
    Ok(())
}
