//! # Domain Layer (Inner Hexagon)
//!
//! Pure lifecycle rules: value objects, entities, the entity store, the
//! access policy and invariant checks. No I/O, no locking, no clocks.

pub mod access;
pub mod entities;
pub mod invariants;
pub mod store;
pub mod value_objects;

pub use access::*;
pub use entities::*;
pub use invariants::*;
pub use store::*;
pub use value_objects::*;
