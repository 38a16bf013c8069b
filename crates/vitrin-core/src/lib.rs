//! Vitrin Core: shared types, traits, errors, and the metadata schema.
//!
//! This crate provides the foundational types used across all Vitrin crates.
//! It has no internal Vitrin dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`model`]: Canonical document metadata (contact, links, sections)
//! - [`links`]: Contact link derivation (WhatsApp, `tel:`, `mailto:`)
//! - [`context`]: Per-render context handed to body rendering
//! - [`state`]: Page render state and readiness notification
//! - [`traits`]: Core traits for configuration abstraction

#![doc = include_str!("../README.md")]

pub mod context;
pub mod error;
pub mod links;
pub mod model;
pub mod state;
pub mod traits;

// Re-export key types at crate root for convenience
pub use context::RenderContext;
pub use error::{Error, Result};
pub use model::{Contact, ContactLink, Figure, Metadata, Section};
pub use state::{CONTENT_READY_EVENT, PageRenderState};
pub use traits::ConfigProvider;
