//! Vitrin CLI: page controller, document sources, and the `vitrin` binary.
//!
//! # Key Abstractions
//!
//! - [`PageController`]: the fetch → render → bind → ready load cycle
//! - [`DocumentSource`]: where the landing document comes from
//! - [`VitrinConfig`]: file/env configuration via `confyg`
//! - [`VitrinCli`]: command dispatch and logging setup

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod controller;
pub mod preload;
pub mod source;

pub use app::VitrinCli;
pub use cli::CliArgs;
pub use config::VitrinConfig;
pub use controller::{LoadOutcome, PageController};
pub use preload::{HttpImageLoader, NoopImageLoader};
pub use source::{DocumentSource, FileSource, HttpSource, StaticSource, source_for};
