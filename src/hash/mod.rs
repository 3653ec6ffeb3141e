//! Hashers: turning items into bit indices.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── hasher.rs      - Hasher trait, duplicate removal, HasherCollection
//! ├── strategies.rs  - SimpleHasher and EnhancedDoubleHasher
//! ├── xxhash.rs      - XXH3-128 seeding from application bytes
//! └── mod.rs         - This file (public API)
//! ```
//!
//! # Quick Start
//!
//! ```
//! use bloomforge::core::{IndexExtractor, Shape};
//! use bloomforge::hash::{EnhancedDoubleHasher, Hasher};
//!
//! let shape = Shape::from_np(10_000, 0.01).unwrap();
//! let hasher = EnhancedDoubleHasher::from_data(b"hello");
//! let indices = hasher.indices(&shape).as_index_array();
//! assert_eq!(indices.len(), shape.number_of_hash_functions());
//! ```
//!
//! # Choosing a Hasher
//!
//! | Hasher                   | Distribution | Use Case                          |
//! |--------------------------|--------------|-----------------------------------|
//! | [`EnhancedDoubleHasher`] | Excellent    | Default, seeded from a digest     |
//! | [`SimpleHasher`]         | Good         | Predictable indices for tests     |
//! | [`HasherCollection`]     | n/a          | Several items merged at once      |

#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod hasher;
pub mod strategies;
pub mod xxhash;

pub use hasher::{Hasher, HasherCollection};
pub use strategies::{EnhancedDoubleHasher, SimpleHasher};
pub use xxhash::XxHasher;
