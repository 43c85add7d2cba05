//! Core library for dockgen
//!
//! This crate implements the **Functional Core** of the dockgen application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`dockgen_core`** (this crate): Pure transformation functions with zero I/O
//! - **`dockgen`**: HTTP calls, file writes and orchestration (the Imperative Shell)
//!
//! All functions in this crate are deterministic and free of side effects, so
//! they are tested with fixture data only.
//!
//! # Module Organization
//!
//! - [`github`]: Repository URL parsing, GitHub API types and content decoding
//! - [`prompt`]: Prompt assembly from repository metadata and files
//! - [`completion`]: Completion API types and artifact extraction
//! - [`dockerfile`]: Post-processing and plausibility checks for the artifact
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use dockgen_core::prompt::{build_prompt, PromptStyle, RepositoryFile, RepositoryMetadata};
//!
//! let metadata = RepositoryMetadata {
//!     name: "hello-world".to_string(),
//!     description: None,
//!     html_url: "https://github.com/octocat/hello-world".to_string(),
//!     readme: "# Hello".to_string(),
//! };
//! let files = vec![RepositoryFile {
//!     name: "package.json".to_string(),
//!     content: "{}".to_string(),
//! }];
//!
//! let prompt = build_prompt(&metadata, &files, PromptStyle::Standard);
//! assert!(prompt.contains("package.json: {}"));
//! ```

pub mod completion;
pub mod dockerfile;
pub mod github;
pub mod prompt;
