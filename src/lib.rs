//! # Introduction
//!
//! logwrap reads a C header, recovers its declarations, and writes a C
//! source file that wraps every discovered function prototype: each wrapper
//! `dlopen`s the real library, resolves the symbol once under a lock, logs
//! entry parameters and exit values with per-type formatters, and forwards
//! the call.
//!
//! ## Generation pipeline
//!
//! ```text
//! Header → Lexer → Tree Builder → Declaration Interpreter → Declarations → Code Generator → C source
//! ```
//!
//! 1. [`parser`] — tokenizes the header, groups tokens into a bracket tree,
//!    and classifies every node into enum/struct/typedef/function/global
//!    entities.
//! 2. [`config`] — the optional section/key configuration controlling
//!    formatters, checkers, overrides and ignore patterns.
//! 3. [`codegen`] — emits the preamble and one wrapper per function,
//!    consulting the formatter/checker resolver per value.
//! 4. [`diag`] — skip-and-continue diagnostics collected along the way.
//!
//! The generator itself is a single-threaded batch pass; only the
//! *generated* C code deals with concurrency, guarding symbol resolution
//! and log records with one mutex.
//!
//! ## Input assumptions
//!
//! Headers are expected preprocessor-normalized: directives are skipped,
//! macros are not expanded, and types are not resolved across files.
//! Unrecognized constructs are reported and skipped, never fatal.

pub mod codegen;
pub mod config;
pub mod diag;
pub mod error;
pub mod parser;

pub use error::Error;
