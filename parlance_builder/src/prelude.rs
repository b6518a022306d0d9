//! Traits which, typically, may be imported without concern: `use parlance::prelude::*`.

/// Behaviour for multiple (0 to many) items T to be collected together.
// Needs to be imported in order to implement a custom `Collectable`.
pub trait Collectable<T> {
    /// Add a value to this `Collectable`.
    fn add(&mut self, item: T);
}

/// Behaviour for key/value entries to be collected together.
// Needs to be imported in order to implement a custom `KeyedCollectable`.
pub trait KeyedCollectable<K, V> {
    /// Whether an entry for `key` is already present.
    fn contains(&self, key: &K) -> bool;

    /// Insert an entry, replacing the value of an existing key.
    fn put(&mut self, key: K, value: V);
}
