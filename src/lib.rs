#![deny(missing_docs)]
//! Dynamic accumulator for a multiset of 32-byte hashes,
//! inspired by Tadge Dryja's Utreexo design.
//!
//! The accumulator stores items as leaves of a forest of perfectly balanced
//! merkle binary trees, one tree per power of two, so that the occupied
//! levels spell out the binary representation of the item count.
//! Each [`Forest::update`] call deletes a batch of items (each authorized by
//! a proof of inclusion), inserts a batch of new ones, and re-merges the
//! trees bottom-up. The returned [`Catchup`] record is a summary of the
//! hashing performed during the cycle: outstanding proofs made against the
//! previous state patch themselves with [`Proof::update`], and proofs for
//! the freshly inserted items are produced with [`Catchup::proof`].
//!
//! Hashing is injected via the [`NodeHasher`] trait; [`TranscriptHasher`]
//! is the provided Merlin-transcript-based combiner.

#[macro_use]
extern crate failure;

mod catchup;
mod errors;
mod forest;
mod hash;
mod proof;


// Public API
pub use self::catchup::Catchup;
pub use self::errors::UtreexoError;
pub use self::forest::Forest;
pub use self::hash::{Hash, NodeHasher, TranscriptHasher};
pub use self::proof::{Proof, ProofStep, Side};
