//! Fill missing or empty locale entries using the reference language as the
//! source of truth.
//!
//! The pipeline runs leaf-first: [`reference`] loads the reference file set,
//! [`analyzer`] diffs every target language against it, [`batcher`] groups the
//! resulting tasks, [`translation`] sends each batch through a
//! [`provider::TranslationProvider`] and validates the output, and [`updater`]
//! merges accepted results back to disk. [`orchestrator`] drives the whole run.

pub mod analyzer;
pub mod batcher;
pub mod config;
pub mod error;
pub mod i18n;
pub mod openai;
pub mod orchestrator;
pub mod provider;
pub mod reference;
pub mod retry;
pub mod stats;
pub mod translation;
pub mod updater;
