//! Content fingerprints using FxHash.
//!
//! Not cryptographic. Used to tell whether a document's bytes still match a
//! previously parsed representation.
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let h = hash::compute(b"<html></html>"); // -> u64
//! ```

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}
