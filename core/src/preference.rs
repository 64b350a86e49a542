//! Bottom-up preference aggregation.
//!
//! Preferences travel the opposite way to the environment: a node deep in
//! the tree writes a value for a [`PreferenceKey`], and the nearest enclosing
//! reader of that key receives the reduction of every value written in its
//! subtree, in document order.
//!
//! The [`PreferenceLedger`] is the traversal-scoped bookkeeping for this. It
//! is a stack of reader scopes; writes land in the innermost scope listening
//! for the same key and are discarded when nobody listens.

use std::any::{Any, TypeId, type_name};
use std::fmt;

/// A type-erased preference value.
pub type AnyValue = Box<dyn Any + Send>;

/// A typed preference key with an associative combine rule.
pub trait PreferenceKey: 'static {
    /// The aggregated value type.
    type Value: Clone + fmt::Debug + Send + Sync + 'static;

    /// Value delivered to a reader whose subtree wrote nothing.
    fn default_value() -> Self::Value;

    /// Folds `next` into `value`. Called left to right in document order.
    ///
    /// Must be associative. The default keeps the last value written.
    fn reduce(value: &mut Self::Value, next: Self::Value) {
        *value = next;
    }
}

fn reduce_erased<K: PreferenceKey>(acc: &mut AnyValue, next: AnyValue) {
    match (acc.downcast_mut::<K::Value>(), next.downcast::<K::Value>()) {
        (Some(acc), Ok(next)) => K::reduce(acc, *next),
        _ => tracing::warn!(key = type_name::<K>(), "preference value of unexpected type"),
    }
}

fn clone_erased<K: PreferenceKey>(value: &AnyValue) -> AnyValue {
    match value.downcast_ref::<K::Value>() {
        Some(v) => Box::new(v.clone()),
        None => Box::new(K::default_value()),
    }
}

fn default_erased<K: PreferenceKey>() -> AnyValue {
    Box::new(K::default_value())
}

/// A type-erased descriptor of a [`PreferenceKey`].
#[derive(Clone, Copy)]
pub struct PreferenceSlot {
    type_id: TypeId,
    name: &'static str,
    reduce: fn(&mut AnyValue, AnyValue),
    clone: fn(&AnyValue) -> AnyValue,
    default: fn() -> AnyValue,
}

impl fmt::Debug for PreferenceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl PartialEq for PreferenceSlot {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for PreferenceSlot {}

impl PreferenceSlot {
    /// Describes `K`.
    #[must_use]
    pub fn of<K: PreferenceKey>() -> Self {
        Self {
            type_id: TypeId::of::<K>(),
            name: type_name::<K>(),
            reduce: reduce_erased::<K>,
            clone: clone_erased::<K>,
            default: default_erased::<K>,
        }
    }

    /// Type id of the key.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the key.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this slot describes `K`.
    #[must_use]
    pub fn is<K: PreferenceKey>(&self) -> bool {
        self.type_id == TypeId::of::<K>()
    }

    /// The key's default, erased.
    #[must_use]
    pub fn default_value(&self) -> AnyValue {
        (self.default)()
    }

    /// Clones an erased value of this key.
    #[must_use]
    pub fn clone_value(&self, value: &AnyValue) -> AnyValue {
        (self.clone)(value)
    }

    fn combine(&self, acc: &mut Option<AnyValue>, next: AnyValue) {
        match acc {
            Some(current) => (self.reduce)(current, next),
            None => *acc = Some(next),
        }
    }
}

struct Scope {
    slot: PreferenceSlot,
    terminal: bool,
    suspended: bool,
    value: Option<AnyValue>,
    contributions: usize,
}

/// The result of closing a reader scope.
pub struct ClosedScope {
    /// The key the scope listened to.
    pub slot: PreferenceSlot,
    /// The reduced value, or `None` if nothing was written.
    pub value: Option<AnyValue>,
    /// How many writes were folded into `value`.
    pub contributions: usize,
}

impl fmt::Debug for ClosedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosedScope")
            .field("slot", &self.slot)
            .field("contributions", &self.contributions)
            .finish_non_exhaustive()
    }
}

impl ClosedScope {
    /// The reduced value, or the key's default when nothing was written.
    #[must_use]
    pub fn into_value(self) -> AnyValue {
        match self.value {
            Some(value) => value,
            None => self.slot.default_value(),
        }
    }
}

/// Traversal-scoped stack of preference reader scopes.
#[derive(Default)]
pub struct PreferenceLedger {
    scopes: Vec<Scope>,
    discarded: usize,
}

impl fmt::Debug for PreferenceLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceLedger")
            .field(
                "scopes",
                &self.scopes.iter().map(|s| s.slot).collect::<Vec<_>>(),
            )
            .field("discarded", &self.discarded)
            .finish()
    }
}

impl PreferenceLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh, empty scope for `slot` and returns its index.
    ///
    /// A `terminal` scope swallows its result; otherwise the reduced value is
    /// forwarded to the next enclosing scope for the same key on close.
    pub fn open(&mut self, slot: PreferenceSlot, terminal: bool) -> usize {
        self.scopes.push(Scope {
            slot,
            terminal,
            suspended: false,
            value: None,
            contributions: 0,
        });
        self.scopes.len() - 1
    }

    /// Stages a write. Returns `false` if no scope listens for `slot`.
    pub fn write(&mut self, slot: PreferenceSlot, value: AnyValue) -> bool {
        let Some(scope) = self
            .scopes
            .iter_mut()
            .rev()
            .find(|scope| !scope.suspended && scope.slot == slot)
        else {
            self.discarded += 1;
            tracing::trace!(key = slot.name(), "preference write with no reader");
            return false;
        };
        slot.combine(&mut scope.value, value);
        scope.contributions += 1;
        true
    }

    /// Closes the innermost scope.
    ///
    /// Non-terminal scopes that received writes forward their reduced value
    /// as a single write to the next enclosing reader of the same key.
    pub fn close(&mut self) -> Option<ClosedScope> {
        let scope = self.scopes.pop()?;
        if !scope.terminal
            && let Some(value) = &scope.value
        {
            let forwarded = scope.slot.clone_value(value);
            self.write(scope.slot, forwarded);
        }
        Some(ClosedScope {
            slot: scope.slot,
            value: scope.value,
            contributions: scope.contributions,
        })
    }

    /// Excludes the scope at `index` from receiving writes.
    pub fn suspend(&mut self, index: usize) {
        if let Some(scope) = self.scopes.get_mut(index) {
            scope.suspended = true;
        }
    }

    /// Re-admits the scope at `index`.
    pub fn resume(&mut self, index: usize) {
        if let Some(scope) = self.scopes.get_mut(index) {
            scope.suspended = false;
        }
    }

    /// Number of open scopes.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Writes that found no listener.
    #[must_use]
    pub const fn discarded(&self) -> usize {
        self.discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Last;
    impl PreferenceKey for Last {
        type Value = i32;
        fn default_value() -> i32 {
            0
        }
    }

    struct Sum;
    impl PreferenceKey for Sum {
        type Value = i32;
        fn default_value() -> i32 {
            0
        }
        fn reduce(value: &mut i32, next: i32) {
            *value += next;
        }
    }

    struct Trail;
    impl PreferenceKey for Trail {
        type Value = Vec<&'static str>;
        fn default_value() -> Self::Value {
            Vec::new()
        }
        fn reduce(value: &mut Self::Value, next: Self::Value) {
            value.extend(next);
        }
    }

    fn take<K: PreferenceKey>(closed: ClosedScope) -> K::Value {
        *closed.into_value().downcast::<K::Value>().unwrap()
    }

    #[test]
    fn default_rule_keeps_last_value() {
        let mut ledger = PreferenceLedger::new();
        ledger.open(PreferenceSlot::of::<Last>(), true);
        for v in [1, 2, 3] {
            assert!(ledger.write(PreferenceSlot::of::<Last>(), Box::new(v)));
        }
        assert_eq!(take::<Last>(ledger.close().unwrap()), 3);
    }

    #[test]
    fn combine_runs_in_document_order() {
        let mut ledger = PreferenceLedger::new();
        let slot = PreferenceSlot::of::<Trail>();
        ledger.open(slot, true);
        ledger.write(slot, Box::new(vec!["a"]));
        ledger.write(slot, Box::new(vec!["b"]));
        ledger.write(slot, Box::new(vec!["c"]));
        assert_eq!(take::<Trail>(ledger.close().unwrap()), vec!["a", "b", "c"]);
    }

    #[test]
    fn writes_without_reader_are_discarded() {
        let mut ledger = PreferenceLedger::new();
        ledger.open(PreferenceSlot::of::<Sum>(), true);
        assert!(!ledger.write(PreferenceSlot::of::<Last>(), Box::new(5)));
        assert_eq!(ledger.discarded(), 1);
        let closed = ledger.close().unwrap();
        assert_eq!(closed.contributions, 0);
        assert_eq!(take::<Sum>(closed), 0);
    }

    #[test]
    fn nested_reader_forwards_reduced_value_once() {
        let slot = PreferenceSlot::of::<Sum>();
        let mut ledger = PreferenceLedger::new();
        ledger.open(slot, true);
        ledger.write(slot, Box::new(1));

        ledger.open(slot, false);
        ledger.write(slot, Box::new(2));
        ledger.write(slot, Box::new(3));
        let inner = ledger.close().unwrap();
        assert_eq!(inner.contributions, 2);
        assert_eq!(take::<Sum>(inner), 5);

        let outer = ledger.close().unwrap();
        assert_eq!(outer.contributions, 2);
        assert_eq!(take::<Sum>(outer), 6);
    }

    #[test]
    fn terminal_reader_does_not_leak() {
        let slot = PreferenceSlot::of::<Sum>();
        let mut ledger = PreferenceLedger::new();
        ledger.open(slot, true);
        ledger.open(slot, true);
        ledger.write(slot, Box::new(4));
        assert_eq!(take::<Sum>(ledger.close().unwrap()), 4);
        let outer = ledger.close().unwrap();
        assert_eq!(outer.contributions, 0);
    }

    #[test]
    fn suspended_scope_is_skipped() {
        let slot = PreferenceSlot::of::<Sum>();
        let mut ledger = PreferenceLedger::new();
        ledger.open(slot, true);
        let inner = ledger.open(slot, true);
        ledger.suspend(inner);
        ledger.write(slot, Box::new(9));
        ledger.resume(inner);
        ledger.write(slot, Box::new(1));
        assert_eq!(take::<Sum>(ledger.close().unwrap()), 1);
        assert_eq!(take::<Sum>(ledger.close().unwrap()), 9);
    }
}
