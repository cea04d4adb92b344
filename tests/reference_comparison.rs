//! Reference comparison: fixed-seed builds must reproduce logits exactly.
//!
//! Uses a 2-layer, 2-head, embedding-dim-8 model built from seed 42.

use wordformer::{build_model, AttentionVariant, InferenceEngine, ModelConfig};

const SEED: u64 = 42;
const TEST_INPUT: [usize; 4] = [2, 5, 6, 7];

fn reference_config() -> ModelConfig {
    ModelConfig {
        vocabulary_size: 20,
        embedding_dim: 8,
        hidden_layer_sizes: vec![],
        attention_heads: 2,
        transformer_layers: 2,
        max_sequence_length: 16,
        ..Default::default()
    }
}

fn fresh_engine(config: ModelConfig, seed: u64) -> InferenceEngine {
    build_model(config, Some(seed)).unwrap().engine().unwrap()
}

#[test]
fn reference_comparison_bit_identical_across_builds() {
    let a = fresh_engine(reference_config(), SEED).forward_all(&TEST_INPUT).unwrap();
    let b = fresh_engine(reference_config(), SEED).forward_all(&TEST_INPUT).unwrap();
    let bits = |m: &wordformer::Matrix| m.as_slice().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a), bits(&b), "same seed must give bit-identical logits");
}

#[test]
fn reference_comparison_seed_matters() {
    let a = fresh_engine(reference_config(), SEED).forward_last(&TEST_INPUT).unwrap();
    let b = fresh_engine(reference_config(), SEED + 1).forward_last(&TEST_INPUT).unwrap();
    assert_ne!(a, b);
}

#[test]
fn reference_comparison_logits_finite() {
    let logits = fresh_engine(reference_config(), SEED).forward_last(&TEST_INPUT).unwrap();
    assert_eq!(logits.len(), 20);
    assert!(
        logits.iter().all(|x| x.is_finite()),
        "logits must be finite (no NaN/Inf)"
    );
    assert!(logits.iter().any(|&x| x != 0.0), "logits must not be all zero");
}

#[test]
fn reference_comparison_causal_mask() {
    for attention in [AttentionVariant::ScaledDotProduct, AttentionVariant::ValueOnly] {
        let engine = fresh_engine(
            ModelConfig {
                attention,
                ..reference_config()
            },
            SEED,
        );
        let base = engine.forward_all(&TEST_INPUT).unwrap();
        for j in 0..TEST_INPUT.len() {
            let mut mutated = TEST_INPUT;
            mutated[j] = (mutated[j] + 3) % 20;
            let other = engine.forward_all(&mutated).unwrap();
            for i in 0..j {
                let same = base
                    .row(i)
                    .iter()
                    .zip(other.row(i))
                    .all(|(x, y)| x.to_bits() == y.to_bits());
                assert!(same, "position {i} changed after mutating position {j}");
            }
        }
    }
}

#[test]
fn reference_comparison_incremental_matches_full() {
    let engine = fresh_engine(reference_config(), SEED);
    let mut cache = engine.create_cache();
    let full = engine.forward_all(&TEST_INPUT).unwrap();
    for (i, &id) in TEST_INPUT.iter().enumerate() {
        let step = engine.forward_step(id, &mut cache).unwrap();
        assert_eq!(step.as_slice(), full.row(i));
    }
}
