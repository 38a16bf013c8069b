//! Payload decoding and markdown rendering.
//!
//! This crate turns the fetched landing document into typed metadata and
//! section bodies into HTML fragments.
//!
//! # Features
//!
//! - Format detection for JSON, frontmatter+markdown, and bare YAML
//! - Canonical `meta` unwrapping shared by every format
//! - `{{ whatsapp_link }}` token expansion before markdown conversion

#![doc = include_str!("../README.md")]

pub mod markdown;
pub mod payload;

pub use markdown::MarkdownRenderer;
pub use payload::{ParsedPayload, PayloadFormat, parse_payload};
