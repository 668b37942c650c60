//! Sentiment prediction pipelines over pre-fit text artifacts.
//!
//! Powered by [Candle](https://github.com/huggingface/candle). A pipeline
//! loads two serialized artifacts once - a text vectorizer and a
//! classifier - then answers synchronous, stateless prediction calls
//! with a label and a capability-dependent confidence value.

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod error;

pub use pipelines::sentiment;
