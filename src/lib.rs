//! Web IDL parser and serializer
//!
//! A two-stage pipeline that turns Web IDL source text into a fully-typed
//! abstract syntax tree and emits it as a canonical structured document:
//!
//! 1. [`lexer`] tokenizes the source text.
//! 2. [`parser`] drives a recursive-descent grammar over the token stream,
//!    with bounded lookahead, speculative backtracking, and panic-mode
//!    error recovery, producing an [`ast::Document`].
//! 3. [`serializer`] walks the AST into a canonical `serde_json::Value`
//!    document tree.
//!
//! [`api`] wraps the pipeline in a pure, I/O-free interface; the
//! `webidl2json` binary is a thin CLI wrapper around it.
//!
//! This crate performs no semantic validation — no name resolution,
//! inheritance-cycle detection, mixin-inclusion expansion, or
//! extended-attribute legality checking. Those belong to a separate
//! semantic phase over the document this crate emits.

pub mod api;
pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod serializer;
