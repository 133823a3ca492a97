//! # kvs-cli — CLI Tool for the Key/Value Schema Stack
//!
//! Provides the `kvs` command-line interface over `kvs-schema`.
//!
//! ## Subcommands
//!
//! - `kvs validate` — Validate a record document against a schema, with
//!   optional coercion of stringified values.
//! - `kvs check-schema` — Parse a schema document and list what it maps.
//!
//! ```bash
//! kvs validate --schema listing.schema.yaml --coerce=top-level listing.json -o clean.json
//! kvs validate -s listing.schema.json --strict --report json listing.json
//! kvs check-schema listing.schema.yaml
//! ```
//!
//! Exit codes: 0 on success, 1 on validation failure, 2 on operational error.

pub mod check;
pub mod config;
pub mod validate;
