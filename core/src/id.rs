//! Positional view identity.
//!
//! A node has no identity of its own; it is identified by where it sits in
//! the graph. The root is [`ViewId::ROOT`] and the `n`th child of a node is
//! `parent.child(n)`. A child keyed with `.id(key)` is `parent.explicit(key)`
//! instead, so it keeps its identity when its siblings are reordered.
//! Identities are stable across traversals as long as the graph shape at
//! that position is unchanged.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable identity of a node position.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewId(u64);

const CHILD_SALT: u64 = 0x9e37_79b9_7f4a_7c15;
const EXPLICIT_SALT: u64 = 0xc2b2_ae3d_27d4_eb4f;

const fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl ViewId {
    /// Identity of the graph root.
    pub const ROOT: Self = Self(0);

    /// Identity of the child at `index`.
    #[must_use]
    pub const fn child(self, index: usize) -> Self {
        Self(mix(self.0 ^ CHILD_SALT.wrapping_mul(index as u64 + 1)))
    }

    /// Identity of a child of this node keyed with `key`, at any index.
    #[must_use]
    pub const fn explicit(self, key: u64) -> Self {
        Self(mix(self.0.rotate_left(17) ^ key ^ EXPLICIT_SALT))
    }

    /// Hashes any key into the `u64` accepted by [`explicit`](Self::explicit).
    #[must_use]
    pub fn key_of<T: Hash + ?Sized>(key: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    /// The raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewId({:016x})", self.0)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
