//! Casein IR - identifiers and handles shared by the pattern engine.
//!
//! This crate holds the small, copyable data the rest of the engine passes
//! around:
//! - `Name` for interned identifiers (variables, hash keys, symbols)
//! - `StringInterner` / `SharedInterner` to intern and resolve them
//! - `ExprId` as an opaque handle to a host expression (scrutinee, guard,
//!   arm body, pinned sub-expression)
//! - `ExternalRef` for pins against storage the host resolves (instance,
//!   class and global variables, constants)
//!
//! The pattern tree itself lives in `casein_patterns` because its literals
//! are runtime values.

mod expr_id;
mod interner;
mod name;
mod reference;

pub use expr_id::ExprId;
pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use reference::{ExternalKind, ExternalRef};
