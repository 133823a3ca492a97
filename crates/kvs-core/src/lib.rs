//! # kvs-core — Foundational Types for the Key/Value Schema Stack
//!
//! This crate defines the data that flows through validation: the closed
//! [`Value`] variant, the [`TypeTag`] classification used by the type
//! matcher, the [`KeyVal`] pair, and the [`Record`] document that carries a
//! batch of pairs.
//!
//! ## Key Design Principles
//!
//! 1. **Closed value variant.** `Value` distinguishes integers from
//!    floating-point numbers at the representation level, so type matching
//!    and coercion are exhaustive `match` expressions checked at compile time.
//!
//! 2. **Immutable inputs.** Nothing in the stack mutates a `Value` in place.
//!    Evaluation produces new values.
//!
//! 3. **Serde at the edges.** `Value`, `KeyVal`, and `Record` serialize to
//!    and from any self-describing serde format (JSON, YAML).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `kvs-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod record;
pub mod tag;
pub mod value;

pub use error::KvsError;
pub use record::{KeyVal, Record};
pub use tag::TypeTag;
pub use value::{Map, Value};
