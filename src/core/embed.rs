//! Embedding collaborator: deterministic word vectors with an explicit cache.
//!
//! The simulator treats vectors opaquely; everything here exists so the demo
//! binary and the tests have a self-contained, seed-stable source of
//! embeddings. Unseen tokens get a vector derived from a per-token hash mixed
//! with the table seed, so `embed` does not depend on lookup order.

use hashbrown::HashMap;

use crate::prng::Prng;

/// Default dimensionality of word vectors.
pub const EMBED_DIM: usize = 64;

const NORM_EPS: f64 = 1e-9;

/// Seeded word-vector table with lazy fill on first lookup.
pub struct WordTable {
    dim: usize,
    seed: u64,
    cache: HashMap<String, Vec<f64>>,
}

impl WordTable {
    pub fn new(seed: u64) -> Self {
        Self::with_dim(seed, EMBED_DIM)
    }

    pub fn with_dim(seed: u64, dim: usize) -> Self {
        Self {
            dim,
            seed,
            cache: HashMap::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of tokens materialized so far.
    pub fn cached_tokens(&self) -> usize {
        self.cache.len()
    }

    /// Vector for a single token, synthesizing and caching it on first use.
    pub fn token_vector(&mut self, token: &str) -> &[f64] {
        let dim = self.dim;
        let seed = self.seed;
        self.cache
            .entry(token.to_string())
            .or_insert_with(|| {
                let mut rng = Prng::new(seed ^ fnv1a(token.as_bytes()));
                (0..dim).map(|_| rng.normal(0.0, 1.0)).collect()
            })
            .as_slice()
    }

    /// Sentence embedding: mean of token vectors, L2-normalized.
    ///
    /// Tokens are lowercased, split on whitespace and dashes, and stripped of
    /// non-alphanumeric characters. Texts with no usable tokens embed to the
    /// zero vector; `cosine` tolerates that and returns 0.
    pub fn embed(&mut self, text: &str) -> Vec<f64> {
        let mut sum = vec![0.0; self.dim];
        let mut count = 0usize;

        for raw in text.split(|c: char| c.is_whitespace() || c == '-' || c == '\u{2014}') {
            let token: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if token.is_empty() {
                continue;
            }
            let vec = self.token_vector(&token);
            for (s, x) in sum.iter_mut().zip(vec) {
                *s += x;
            }
            count += 1;
        }

        if count == 0 {
            return sum;
        }

        for s in sum.iter_mut() {
            *s /= count as f64;
        }
        let norm = l2_norm(&sum);
        for s in sum.iter_mut() {
            *s /= norm + NORM_EPS;
        }
        sum
    }
}

/// Cosine similarity; zero-norm inputs score 0 rather than failing.
///
/// The result is clamped to `[-1, 1]` so identical vectors compare as
/// exactly 1 despite rounding in the norm product.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let na = l2_norm(a);
    let nb = l2_norm(b);
    if na <= NORM_EPS || nb <= NORM_EPS {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    (dot / (na * nb)).clamp(-1.0, 1.0)
}

/// Cosine clamped to `[0, 1]`: the similarity the graph actually stores.
pub fn similarity(a: &[f64], b: &[f64]) -> f64 {
    cosine(a, b).max(0.0)
}

fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xCBF29CE484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001B3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_is_deterministic_per_seed() {
        let mut a = WordTable::new(7);
        let mut b = WordTable::new(7);
        assert_eq!(a.embed("truth grows slowly"), b.embed("truth grows slowly"));

        let mut c = WordTable::new(8);
        assert_ne!(a.embed("truth grows slowly"), c.embed("truth grows slowly"));
    }

    #[test]
    fn embedding_ignores_lookup_order() {
        let mut a = WordTable::new(7);
        let mut b = WordTable::new(7);

        // Warm b's cache with unrelated tokens first.
        b.embed("decay verify evidence");
        assert_eq!(a.embed("grow reinforce"), b.embed("grow reinforce"));
    }

    #[test]
    fn tokenization_strips_punctuation_and_dashes() {
        let mut table = WordTable::new(7);
        let plain = table.embed("grow slowly");
        let noisy = table.embed("Grow—slowly!");
        for (x, y) in plain.iter().zip(&noisy) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_text_embeds_to_zero_and_cosine_guards() {
        let mut table = WordTable::new(7);
        let zero = table.embed("...");
        assert!(zero.iter().all(|&x| x == 0.0));

        let other = table.embed("truth");
        assert_eq!(cosine(&zero, &other), 0.0);
    }

    #[test]
    fn sentence_embeddings_are_unit_norm() {
        let mut table = WordTable::new(7);
        let v = table.embed("uncertainty attention question answer");
        let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn similarity_is_symmetric_and_clamped() {
        let mut table = WordTable::new(7);
        let a = table.embed("grow slowly");
        let b = table.embed("decay fast");
        assert!((similarity(&a, &b) - similarity(&b, &a)).abs() < 1e-12);
        assert!(similarity(&a, &b) >= 0.0);
        assert!(similarity(&a, &a) > 0.99);
    }

    #[test]
    fn cache_fills_lazily() {
        let mut table = WordTable::new(7);
        assert_eq!(table.cached_tokens(), 0);
        table.embed("grow grow decay");
        assert_eq!(table.cached_tokens(), 2);
    }
}
