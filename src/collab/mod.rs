//! External collaborators of the refinement loop.
//!
//! The loop only needs three capabilities from the outside world:
//!
//! | Trait | Contract |
//! |-------|----------|
//! | [`Normalizer`] | raw strings → cleaned strings, same length and order |
//! | [`Embedder`] | strings → vectors, same length and order, deterministic |
//! | [`Clusterer`] | vectors + depth → one cluster id per vector |
//!
//! Default implementations ship with the crate ([`RegexCleaner`],
//! [`HashingEmbedder`], [`crate::cluster::DepthClusterer`]); hosts with real
//! models plug them in through the same traits, or wrap a closure with
//! [`FnEmbedder`] / [`FnClusterer`].

mod clean;
mod embed;

pub use clean::RegexCleaner;
pub use embed::HashingEmbedder;

use crate::error::Result;

/// Cleans and parses raw documents before the first embedding.
pub trait Normalizer {
    /// One normalized string per input, in order. May return empty strings.
    fn normalize(&self, raw: &[String]) -> Result<Vec<String>>;
}

/// Maps strings to fixed-size vectors.
pub trait Embedder {
    /// One vector per input, in order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Groups vectors at a given granularity.
pub trait Clusterer {
    /// One cluster id per vector. Larger depths should produce more clusters.
    fn cluster(&self, vectors: &[Vec<f32>], depth: usize) -> Result<Vec<usize>>;
}

/// Leaves documents untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Normalizer for Identity {
    fn normalize(&self, raw: &[String]) -> Result<Vec<String>> {
        Ok(raw.to_vec())
    }
}

/// An embedder backed by a function.
#[derive(Clone)]
pub struct FnEmbedder<F> {
    f: F,
}

impl<F> FnEmbedder<F> {
    /// Create an embedder from a function.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Embedder for FnEmbedder<F>
where
    F: Fn(&[String]) -> Result<Vec<Vec<f32>>>,
{
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        (self.f)(texts)
    }
}

/// A clusterer backed by a function.
#[derive(Clone)]
pub struct FnClusterer<F> {
    f: F,
}

impl<F> FnClusterer<F> {
    /// Create a clusterer from a function.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Clusterer for FnClusterer<F>
where
    F: Fn(&[Vec<f32>], usize) -> Result<Vec<usize>>,
{
    fn cluster(&self, vectors: &[Vec<f32>], depth: usize) -> Result<Vec<usize>> {
        (self.f)(vectors, depth)
    }
}
