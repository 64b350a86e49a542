//! Top-down implicit parameters.
//!
//! An [`Environment`] is an immutable snapshot mapping typed keys to values.
//! Entering an environment-writing node derives a new snapshot for that
//! subtree only; siblings and ancestors keep observing the snapshot they were
//! given. A snapshot is a chain of writes: deriving links one new write in
//! front of the parent's chain and shares everything behind it, and a lookup
//! walks outward to the nearest write of its key.
//!
//! ```ignore
//! struct Spacing;
//!
//! impl EnvKey for Spacing {
//!     type Value = f32;
//!     fn default_value() -> f32 { 8.0 }
//! }
//!
//! let env = Environment::new().derive::<Spacing>(12.0);
//! assert_eq!(env.lookup::<Spacing>(), 12.0);
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

/// A typed environment key.
///
/// The key type itself is only a marker; the associated `Value` is what gets
/// stored. When a snapshot holds no value for the key, the registered
/// default (see [`defaults`]) or [`default_value`](Self::default_value) is
/// returned.
pub trait EnvKey: 'static {
    /// The stored value type.
    type Value: Clone + Send + Sync + 'static;

    /// Value observed when nothing in the tree wrote this key.
    fn default_value() -> Self::Value;
}

/// One write in a snapshot's chain.
struct Link {
    key: TypeId,
    name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    /// Distinct keys in the chain up to and including this link.
    len: usize,
    parent: Option<Arc<Link>>,
}

/// An immutable snapshot of environment values.
#[derive(Clone, Default)]
pub struct Environment {
    head: Option<Arc<Link>>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen = Vec::new();
        let mut set = f.debug_set();
        for link in self.links() {
            if !seen.contains(&link.key) {
                seen.push(link.key);
                set.entry(&link.name);
            }
        }
        set.finish()
    }
}

impl Environment {
    /// Creates an empty snapshot; every lookup yields its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes from the nearest to the outermost.
    fn links(&self) -> impl Iterator<Item = &Link> {
        std::iter::successors(self.head.as_deref(), |link| link.parent.as_deref())
    }

    fn find(&self, key: TypeId) -> Option<&Link> {
        self.links().find(|link| link.key == key)
    }

    /// Returns a new snapshot where `K` maps to `value`.
    #[must_use]
    pub fn derive<K: EnvKey>(&self, value: K::Value) -> Self {
        let key = TypeId::of::<K>();
        let len = self.len() + usize::from(self.find(key).is_none());
        Self {
            head: Some(Arc::new(Link {
                key,
                name: type_name::<K>(),
                value: Arc::new(value),
                len,
                parent: self.head.clone(),
            })),
        }
    }

    /// Reads `K`, falling back to its default.
    #[must_use]
    pub fn lookup<K: EnvKey>(&self) -> K::Value {
        self.find(TypeId::of::<K>())
            .and_then(|link| link.value.downcast_ref::<K::Value>())
            .cloned()
            .unwrap_or_else(defaults::get::<K>)
    }

    /// Reads `K`, applies `f` and writes the result into a new snapshot.
    #[must_use]
    pub fn transform<K: EnvKey>(&self, f: impl FnOnce(K::Value) -> K::Value) -> Self {
        self.derive::<K>(f(self.lookup::<K>()))
    }

    /// Returns true if some enclosing node wrote `K`.
    #[must_use]
    pub fn contains<K: EnvKey>(&self) -> bool {
        self.find(TypeId::of::<K>()).is_some()
    }

    /// Number of keys written into this snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.head.as_ref().map_or(0, |link| link.len)
    }

    /// Returns true if nothing was written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns true if both snapshots share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

type ApplyFn = dyn Fn(&Environment) -> Environment + Send + Sync;

/// Parameters of an environment-writing node.
#[derive(Clone)]
pub struct EnvironmentWrite {
    key: &'static str,
    apply: Arc<ApplyFn>,
}

impl fmt::Debug for EnvironmentWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentWrite")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl EnvironmentWrite {
    /// Replaces `K` for the subtree.
    #[must_use]
    pub fn set<K: EnvKey>(value: K::Value) -> Self {
        Self {
            key: type_name::<K>(),
            apply: Arc::new(move |env: &Environment| env.derive::<K>(value.clone())),
        }
    }

    /// Composes onto the inherited value of `K` for the subtree.
    #[must_use]
    pub fn transform<K: EnvKey>(f: impl Fn(K::Value) -> K::Value + Send + Sync + 'static) -> Self {
        Self {
            key: type_name::<K>(),
            apply: Arc::new(move |env: &Environment| env.transform::<K>(&f)),
        }
    }

    /// Name of the written key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Derives the snapshot seen by the subtree.
    #[must_use]
    pub fn apply(&self, env: &Environment) -> Environment {
        (self.apply)(env)
    }
}

/// Process-wide default values.
///
/// Defaults are registered once at startup, before the first traversal seals
/// the registry. Snapshots only shadow these values; they never modify them.
pub mod defaults {
    use std::any::{Any, TypeId, type_name};
    use std::collections::BTreeMap;
    use std::sync::{Arc, OnceLock, PoisonError, RwLock};

    use super::EnvKey;
    use crate::error::EnvError;

    type Table = BTreeMap<TypeId, Arc<dyn Any + Send + Sync>>;

    static PENDING: OnceLock<RwLock<Table>> = OnceLock::new();
    static SEALED: OnceLock<Table> = OnceLock::new();

    fn pending() -> &'static RwLock<Table> {
        PENDING.get_or_init(|| RwLock::new(BTreeMap::new()))
    }

    /// Registers the default for `K`.
    ///
    /// # Errors
    ///
    /// Fails once the registry is sealed, or if `K` already has a default.
    pub fn register<K: EnvKey>(value: K::Value) -> Result<(), EnvError> {
        let key = type_name::<K>();
        if SEALED.get().is_some() {
            return Err(EnvError::RegistrySealed { key });
        }
        let mut table = pending()
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if table.contains_key(&TypeId::of::<K>()) {
            return Err(EnvError::AlreadyRegistered { key });
        }
        table.insert(TypeId::of::<K>(), Arc::new(value));
        tracing::debug!(key, "registered environment default");
        Ok(())
    }

    /// Freezes the registry. Idempotent.
    pub fn seal() {
        SEALED.get_or_init(|| {
            let table = pending()
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            tracing::debug!(count = table.len(), "sealed environment defaults");
            table.clone()
        });
    }

    /// Returns true once [`seal`] has run.
    #[must_use]
    pub fn is_sealed() -> bool {
        SEALED.get().is_some()
    }

    /// The registered default for `K`, or `K::default_value()`.
    #[must_use]
    pub fn get<K: EnvKey>() -> K::Value {
        let lookup = |table: &Table| {
            table
                .get(&TypeId::of::<K>())
                .and_then(|value| value.downcast_ref::<K::Value>())
                .cloned()
        };
        let registered = match SEALED.get() {
            Some(table) => lookup(table),
            None => pending().read().ok().and_then(|table| lookup(&table)),
        };
        registered.unwrap_or_else(K::default_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnvError;

    struct Accent;
    impl EnvKey for Accent {
        type Value = &'static str;
        fn default_value() -> Self::Value {
            "blue"
        }
    }

    struct Depth;
    impl EnvKey for Depth {
        type Value = u32;
        fn default_value() -> Self::Value {
            0
        }
    }

    struct Registered;
    impl EnvKey for Registered {
        type Value = i64;
        fn default_value() -> Self::Value {
            -1
        }
    }

    #[test]
    fn lookup_falls_back_to_default() {
        let env = Environment::new();
        assert_eq!(env.lookup::<Accent>(), "blue");
        assert!(!env.contains::<Accent>());
    }

    #[test]
    fn derive_leaves_parent_untouched() {
        let parent = Environment::new().derive::<Accent>("red");
        let child = parent.derive::<Accent>("green");
        let sibling = parent.derive::<Depth>(3);

        assert_eq!(parent.lookup::<Accent>(), "red");
        assert_eq!(child.lookup::<Accent>(), "green");
        assert_eq!(sibling.lookup::<Accent>(), "red");
        assert_eq!(sibling.lookup::<Depth>(), 3);
        assert_eq!(child.lookup::<Depth>(), 0);
    }

    #[test]
    fn derive_shares_the_parent_chain() {
        let parent = Environment::new().derive::<Depth>(1).derive::<Accent>("red");
        let child = parent.derive::<Accent>("green");

        assert!(child.head.as_ref().unwrap().parent.as_ref().is_some_and(|link| {
            Arc::ptr_eq(link, parent.head.as_ref().unwrap())
        }));
        assert_eq!(child.len(), 2);
        assert_eq!(child.lookup::<Depth>(), 1);
        let expected = format!(
            "{{{:?}, {:?}}}",
            type_name::<Accent>(),
            type_name::<Depth>()
        );
        assert_eq!(format!("{child:?}"), expected);
    }

    #[test]
    fn transform_composes() {
        let env = Environment::new()
            .transform::<Depth>(|d| d + 1)
            .transform::<Depth>(|d| d * 10);
        assert_eq!(env.lookup::<Depth>(), 10);
    }

    #[test]
    fn environment_write_applies_to_snapshot() {
        let write = EnvironmentWrite::transform::<Depth>(|d| d + 2);
        let env = write.apply(&Environment::new().derive::<Depth>(5));
        assert_eq!(env.lookup::<Depth>(), 7);
        assert!(write.key().ends_with("Depth"));
    }

    #[test]
    fn registered_default_shadows_trait_default() {
        if defaults::is_sealed() {
            return;
        }
        defaults::register::<Registered>(42).unwrap();
        assert_eq!(Environment::new().lookup::<Registered>(), 42);
        assert_eq!(
            defaults::register::<Registered>(7),
            Err(EnvError::AlreadyRegistered {
                key: type_name::<Registered>()
            })
        );
    }
}
