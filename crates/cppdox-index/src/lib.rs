//! cppdox-index: Compilation-database driven C++ symbol indexing.
//!
//! Consumes a JSON compilation database, parses every translation unit with
//! tree-sitter-cpp, and fills a shared [`cppdox_core::Index`] with
//! deduplicated, cross-referenced symbols ready for rendering.
//!
//! # Architecture
//!
//! - **compile_db** — compile_commands.json loading
//! - **parser** — per-TU include resolution and tree-sitter parsing
//! - **walker** — AST traversal with lexical scope tracking
//! - **extractors** — per-kind symbol extraction (functions, records, enums,
//!   namespaces, aliases)
//! - **filter** — decides which declarations are documented
//! - **comments** — doc-comment harvesting and brief/long splitting
//! - **usr** — canonical cross-TU identifier synthesis
//! - **resolve** — type-spelling to symbol-ID resolution
//! - **signature** — prototype rendering with name/template offsets
//! - **executor** — thread-pool fan-out across translation units
//! - **indexer** — orchestration and diagnostics
//! - **passes** — single-threaded post-processing over the merged index

pub mod comments;
pub mod compile_db;
pub mod executor;
pub mod extractors;
pub mod filter;
pub mod indexer;
pub mod parser;
pub mod passes;
pub mod resolve;
pub mod signature;
pub mod usr;
pub mod walker;

pub use compile_db::{CompilationDatabase, CompileCommand};
pub use executor::ParallelExecutor;
pub use filter::IgnoreFilter;
pub use indexer::Indexer;
pub use parser::{ParsedFile, TuParser};
pub use walker::Walker;
