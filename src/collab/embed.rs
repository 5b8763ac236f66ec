//! Subword hashing embedder.
//!
//! Each lowercased word contributes its own bucket plus the buckets of its
//! character n-grams (with `<`/`>` boundary markers), hashed with FNV-1a.
//! The summed vector is L2-normalized, so documents sharing words or stems
//! land close together without any trained model.

use super::Embedder;
use crate::config::EmbeddingConfig;
use crate::error::Result;

/// Deterministic, model-free embedder.
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbedder {
    dimensions: usize,
    min_n: usize,
    max_n: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        let config = EmbeddingConfig::default();
        Self {
            dimensions: config.dimensions,
            min_n: config.min_n,
            max_n: config.max_n,
        }
    }
}

impl HashingEmbedder {
    /// Embedder from validated settings.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dimensions: config.dimensions,
            min_n: config.min_n,
            max_n: config.max_n,
        })
    }

    /// Output vector length.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Hash a term into a bucket index using FNV-1a.
    fn bucket(&self, term: &str) -> usize {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for b in term.as_bytes() {
            h ^= u64::from(*b);
            h = h.wrapping_mul(0x0100_0000_01b3);
        }
        (h % self.dimensions as u64) as usize
    }

    /// Embed one document.
    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimensions];
        for word in text.split_whitespace() {
            let word = word.to_lowercase();
            v[self.bucket(&word)] += 1.0;

            let marked: Vec<char> = format!("<{word}>").chars().collect();
            for n in self.min_n..=self.max_n.min(marked.len()) {
                for window in marked.windows(n) {
                    let gram: String = window.iter().collect();
                    v[self.bucket(&gram)] += 1.0;
                }
            }
        }

        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let v = HashingEmbedder::default().vector("");
        assert_eq!(v.len(), 64);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_output_is_normalized() {
        let v = HashingEmbedder::default().vector("rust programming language");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "expected unit norm, got {norm}");
    }

    #[test]
    fn test_deterministic_and_case_insensitive() {
        let e = HashingEmbedder::default();
        assert_eq!(e.vector("Paris"), e.vector("paris"));
    }

    #[test]
    fn test_shared_words_are_closer() {
        let config = EmbeddingConfig {
            dimensions: 512,
            ..EmbeddingConfig::default()
        };
        let e = HashingEmbedder::from_config(&config).unwrap();
        let a = e.vector("red running shoes");
        let b = e.vector("red running shoe");
        let c = e.vector("quantum field theory");
        assert!(cosine(&a, &b) > cosine(&a, &c));
    }

    #[test]
    fn test_batch_matches_individual() {
        let e = HashingEmbedder::default();
        let texts = vec!["hello world".to_string(), "foo bar".to_string()];
        let batch = e.embed(&texts).unwrap();
        for (i, text) in texts.iter().enumerate() {
            assert_eq!(batch[i], e.vector(text));
        }
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = EmbeddingConfig {
            dimensions: 0,
            ..EmbeddingConfig::default()
        };
        assert!(HashingEmbedder::from_config(&config).is_err());
    }
}
