//! Fast non-cryptographic hashing using FxHash.
//!
//! Used where a stable 64-bit value is enough (instrumentation boundaries,
//! directory fingerprints). Version tokens use blake3 instead, see
//! [`crate::cache::version`].
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let h = hash::compute("JsMinify"); // -> u64
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_is_stable() {
        assert_eq!(compute("JsMinify"), compute(b"JsMinify"));
        assert_ne!(compute("JsMinify"), compute("CssMinify"));
    }
}
