//! # strata
//!
//! Persistent (immutable, structurally shared) collections for Rust.
//!
//! ## Overview
//!
//! Every operation that looks like a mutation returns a new version of the
//! collection and leaves every earlier version intact and readable. Versions
//! share all of the structure they have in common, so an update only pays
//! for the nodes on the path it changes.
//!
//! - **Persistent Data Structures**: [`PersistentVector`](persistent::PersistentVector)
//!   (32-way bit-partitioned trie with a tail buffer), `PersistentList`,
//!   `PersistentArrayMap`, `PersistentArraySet`
//! - **Type Classes**: `Functor` and `Foldable`, implemented by the
//!   collections and by `Option` and `Vec`
//!
//! ## Feature Flags
//!
//! - `typeclass`: Type class traits (`Functor`, `Foldable`)
//! - `persistent`: Persistent data structures
//! - `arc`: Share nodes through `Arc` so collections are `Send + Sync`
//! - `serde`: `Serialize`/`Deserialize` for every collection
//! - `rayon`: Parallel iteration over `PersistentVector`
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use strata::prelude::*;
//!
//! let vector: PersistentVector<i32> = (0..40).collect();
//! let updated = vector.push_back(40).set(0, -1).unwrap();
//!
//! assert_eq!(vector.len(), 40);
//! assert_eq!(updated.len(), 41);
//! assert_eq!(vector.get(0), Some(&0));
//! assert_eq!(updated.get(0), Some(&-1));
//! assert_eq!(updated.fold_left(0, |sum, x| sum + x), (1..=40).sum::<i32>() - 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "typeclass")]
    pub use crate::typeclass::*;

    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;
}

#[cfg(feature = "typeclass")]
pub mod typeclass;

#[cfg(feature = "persistent")]
pub mod persistent;
