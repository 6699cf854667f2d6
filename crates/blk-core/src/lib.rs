//! # blk-core
//!
//! Parser, in-memory model, and canonical serializer for **BLK**, a
//! hierarchical strongly-typed text format for configuration and structured
//! data: nested named blocks holding typed scalars, vectors, 4×4 matrices,
//! registered enums, strings, arrays, and sub-blocks, with block inheritance
//! (`extends`) and document inclusion (`#include`).
//!
//! ## Quick start
//!
//! ```rust
//! use blk_core::{parse_str, serialize_block, EnumRegistry};
//!
//! let registry = EnumRegistry::new();
//! let text = "{\nspeed:r = 1.5\nname:s = \"hero\"\nflags {\nvisible:b = true\n}\n}";
//!
//! let block = parse_str(text, &registry).unwrap();
//! assert_eq!(block.get_double("speed", 0.0), 1.5);
//! assert_eq!(block.get_string("name", ""), "hero");
//! assert!(block.get_block("flags").unwrap().get_bool("visible", false));
//!
//! // The canonical form round-trips.
//! let canon = serialize_block(&block, &registry);
//! assert_eq!(parse_str(&canon, &registry).unwrap(), block);
//! ```
//!
//! ## Modules
//!
//! - [`parser`] — text → [`Block`] tree (`parse_str`, `load_file`, [`Parser`]
//!   with include resolution and a structured [`ParseReport`])
//! - [`serializer`] — [`Block`] tree → canonical text
//! - [`block`] — the [`Block`] container and its typed accessor families
//! - [`value`] — the [`Value`] tagged union and [`DataArray`]
//! - [`registry`] — instance-scoped [`EnumRegistry`] for `e_*` types
//! - [`escape`] — string escape codec (`decode_escapes`, `encode_escapes`)
//! - [`json`] — lossy [`Block`] → `serde_json::Value` export
//! - [`math`] — small vector and matrix value types
//! - [`error`] — [`BlkError`], [`Diagnostic`], [`FallbackPolicy`]

pub mod block;
pub mod error;
pub mod escape;
pub mod json;
pub mod math;
pub mod parser;
pub mod registry;
pub mod serializer;
pub mod value;

mod token;

pub use block::{Block, Entry};
pub use error::{BlkError, Diagnostic, FallbackPolicy, Result};
pub use escape::{decode_escapes, encode_escapes};
pub use json::block_to_json;
pub use math::{Float2, Float3, Float4, Int2, Int3, Int4, Mat4};
pub use parser::{
    load_file, parse_str, FsResolver, IncludeResolver, NoIncludes, ParseReport, Parser,
    MAX_INCLUDE_DEPTH,
};
pub use registry::{EnumInfo, EnumRegistry, MAX_ENUMS};
pub use serializer::serialize_block;
pub use value::{DataArray, EnumRef, Value, ValueKind};
