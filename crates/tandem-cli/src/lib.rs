//! # tandem-cli
//!
//! The `tandem` binary: builds every configured package in dependency
//! order, rewriting imports of sibling packages into package imports, and
//! publishes the results.
//!
//! ```text
//! tandem build [--config FILE] [--out-dir DIR] [--dry-run] [--force]
//! tandem graph [--config FILE]
//! tandem check [--config FILE]
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;
