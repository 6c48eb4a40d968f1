/// Type alias representing the 64-bit hash code used throughout the diff engine.
///
/// ```
/// # use structdiff_core::hash_bytes;
/// let code = hash_bytes(b"structdiff");
/// assert_eq!(code.len(), 8);
/// ```
pub type HashCode = [u8; 8];

/// The hash primitive behind content and identity hashing.
///
/// Implementations must be deterministic. The engine treats the output as
/// opaque, so tests can substitute a recording or constant hasher.
///
/// ```
/// # use structdiff_core::{Fnv1a, HashFunction, Node};
/// struct Zero;
///
/// impl HashFunction for Zero {
///     fn hash(&self, _input: &[u8]) -> [u8; 8] {
///         [0; 8]
///     }
/// }
///
/// let node = Node::from_json_str("{\"a\":\"b\"}")?;
/// assert_eq!(node.content_hash_with(&Zero), [0; 8]);
/// assert_ne!(node.content_hash_with(&Fnv1a), [0; 8]);
/// # Ok::<(), structdiff_core::CanonicalizeError>(())
/// ```
pub trait HashFunction {
    /// Hashes `input` into an 8-byte code.
    fn hash(&self, input: &[u8]) -> HashCode;
}

impl<H: HashFunction + ?Sized> HashFunction for &H {
    fn hash(&self, input: &[u8]) -> HashCode {
        (**self).hash(input)
    }
}

/// 64-bit FNV-1a, the default [`HashFunction`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fnv1a;

impl HashFunction for Fnv1a {
    fn hash(&self, input: &[u8]) -> HashCode {
        const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
        const PRIME: u64 = 0x100000001b3;

        let mut hash = OFFSET_BASIS;
        for byte in input {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(PRIME);
        }
        hash.to_le_bytes()
    }
}

/// Compute the FNV-1a hash of the provided bytes.
///
/// ```
/// # use structdiff_core::hash_bytes;
/// let code = hash_bytes(b"diff");
/// let same = hash_bytes(b"diff");
/// assert_eq!(code, same);
/// ```
#[must_use]
pub fn hash_bytes(input: &[u8]) -> HashCode {
    Fnv1a.hash(input)
}

/// Combine hash codes into a single aggregate hash, preserving their order.
///
/// ```
/// # use structdiff_core::{combine_with, hash_bytes, Fnv1a};
/// let a = hash_bytes(b"a");
/// let b = hash_bytes(b"b");
/// assert_ne!(combine_with(&Fnv1a, &[a, b]), combine_with(&Fnv1a, &[b, a]));
/// ```
#[must_use]
pub fn combine_with<H: HashFunction + ?Sized>(hasher: &H, codes: &[HashCode]) -> HashCode {
    let mut bytes = Vec::with_capacity(codes.len() * 8);
    for code in codes {
        bytes.extend_from_slice(code);
    }
    hasher.hash(&bytes)
}
