//! # fileheader
//!
//! Inserts and maintains structured header comments at the top of source
//! files: copyright, license, project and author metadata, a free-text
//! description, a version history and a to-do list.
//!
//! Headers are rendered from templates in the comment syntax of the file's
//! language. Updating a header re-renders it from the current configuration
//! while carrying the hand-written description, history and to-do entries
//! over, so volatile metadata always refreshes and narrative content always
//! persists.
//!
//! ## Features
//!
//! * Comment tokens for many languages, overridable per language
//! * Three header styles (`standard`, `minimal`, `detailed`) with replaceable
//!   templates
//! * Header update with content preservation
//! * Automatically numbered version-history and to-do entries
//! * Save-time refresh of the `Last Updated` and `Editor` fields
//! * Time-zone aware dates
//!
//! ## Usage as a Library
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use fileheader::config::HeaderConfig;
//! use fileheader::document::Document;
//! use fileheader::header::HeaderEngine;
//! use fileheader::templates::TemplateCatalog;
//! use fileheader::variables::FileContext;
//!
//! let engine = HeaderEngine::new(Arc::new(TemplateCatalog::builtin()));
//! let config = HeaderConfig::default();
//! let context = FileContext::new("rust", "/work/src/main.rs").with_user_name("kim");
//!
//! let mut document = Document::parse("fn main() {}\n");
//! engine.insert_header(&document, &context, &config).apply(&mut document);
//! assert!(engine.has_header(&document, &context, &config));
//!
//! engine.insert_todo_entry(&document, &context, &config).apply(&mut document);
//! assert!(document.to_text().contains("(ToDo#01, kim)"));
//! ```
//!
//! ## Modules
//!
//! * [`header`] - Insertion, update, entries and refresh
//! * [`templates`] - Template catalog and header styles
//! * [`variables`] - Template variables for one render
//! * [`comment_syntax`] - Comment tokens per language
//! * [`config`] - Configuration with central defaults
//! * [`logging`] - Logging utilities for verbose output
//!
//! [`header`]: crate::header
//! [`templates`]: crate::templates
//! [`variables`]: crate::variables
//! [`comment_syntax`]: crate::comment_syntax
//! [`config`]: crate::config
//! [`logging`]: crate::logging

pub mod cli;
pub mod comment_syntax;
pub mod config;
pub mod datetime;
pub mod diff;
pub mod document;
pub mod header;
pub mod interpolate;
pub mod logging;
pub mod output;
pub mod report;
pub mod templates;
pub mod variables;
