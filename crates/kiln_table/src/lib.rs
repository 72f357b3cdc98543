//! Bounded-probe Robin Hood hash table keyed by precomputed 64-bit hashes.
//!
//! [`Table`] is the associative container behind every set and map in kiln:
//! file indices, include sets, symbol sets, graph adjacency and the loaded
//! cache. Callers hash their keys themselves (see `kiln_common::key_hash`) and
//! the table treats the 64-bit hash as the key's identity.
//!
//! Probing is open addressing with a hard bound on probe length. Each occupied
//! slot records its displacement from the ideal bucket. Insertion evicts any
//! occupant that sits closer to its own ideal bucket than the item being
//! placed (Robin Hood), and when an item would have to travel `max_offset`
//! slots the table grows by roughly 1.5x and rehashes. `max_offset` is
//! `ceil(log2(capacity))`, so every operation is O(log capacity).
//!
//! Removal back-shifts the following run of displaced slots, keeping every
//! displacement minimal, so no tombstones are needed.

#![warn(missing_docs)]

use std::fmt;

/// Capacity of a freshly created table.
const MIN_CAPACITY: usize = 8;

/// A set of keys with no payload.
pub type KeySet = Table<()>;

#[derive(Clone)]
struct Slot<V> {
    hash: u64,
    offset: u32,
    value: V,
}

/// Open-addressing hash table with Robin Hood displacement and a probe bound.
///
/// Iteration order is unspecified but stable for as long as the table is not
/// mutated.
#[derive(Clone)]
pub struct Table<V> {
    slots: Vec<Option<Slot<V>>>,
    len: usize,
    max_offset: u32,
}

impl<V> Table<V> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Creates an empty table with room for at least `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        Self {
            slots: empty_slots(capacity),
            len: 0,
            max_offset: max_offset_for(capacity),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots currently allocated.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Longest displacement any entry may have at the current capacity.
    pub fn max_offset(&self) -> u32 {
        self.max_offset
    }

    /// Inserts `value` under `hash`.
    ///
    /// Returns `true` if the key was already present, in which case its value
    /// is overwritten.
    pub fn add(&mut self, hash: u64, value: V) -> bool {
        if let Some(slot) = self.find(hash).and_then(|i| self.slots[i].as_mut()) {
            slot.value = value;
            return true;
        }
        if let Err(pending) = self.place(hash, value) {
            self.grow_with(pending);
        }
        false
    }

    /// Returns the value stored under `hash`.
    pub fn get(&self, hash: u64) -> Option<&V> {
        let index = self.find(hash)?;
        self.slots[index].as_ref().map(|slot| &slot.value)
    }

    /// Returns a mutable reference to the value stored under `hash`.
    pub fn get_mut(&mut self, hash: u64) -> Option<&mut V> {
        let index = self.find(hash)?;
        self.slots[index].as_mut().map(|slot| &mut slot.value)
    }

    /// Returns `true` if `hash` is present.
    pub fn has(&self, hash: u64) -> bool {
        self.find(hash).is_some()
    }

    /// Removes `hash`, returning its value.
    pub fn remove(&mut self, hash: u64) -> Option<V> {
        let mut hole = self.find(hash)?;
        let removed = self.slots[hole].take()?;
        self.len -= 1;

        let capacity = self.slots.len();
        for _ in 1..capacity {
            let next = (hole + 1) % capacity;
            match self.slots[next].take() {
                Some(mut slot) if slot.offset > 0 => {
                    slot.offset -= 1;
                    self.slots[hole] = Some(slot);
                    hole = next;
                }
                other => {
                    self.slots[next] = other;
                    break;
                }
            }
        }
        Some(removed.value)
    }

    /// Removes every entry, keeping the allocation.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.len = 0;
    }

    /// Iterates over `(hash, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &V)> + '_ {
        self.slots
            .iter()
            .flatten()
            .map(|slot| (slot.hash, &slot.value))
    }

    /// Iterates over the stored hashes.
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.slots.iter().flatten().map(|slot| slot.hash)
    }

    /// Iterates over the stored values.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.slots.iter().flatten().map(|slot| &slot.value)
    }

    /// Slot index of the ideal bucket for `hash`.
    fn ideal(&self, hash: u64) -> usize {
        (spread(hash) % self.slots.len() as u64) as usize
    }

    /// Probes for `hash`, stopping at an empty slot, a richer occupant, or the
    /// probe bound.
    fn find(&self, hash: u64) -> Option<usize> {
        let capacity = self.slots.len();
        let mut index = self.ideal(hash);
        for offset in 0..self.max_offset {
            match &self.slots[index] {
                None => return None,
                Some(slot) if slot.hash == hash => return Some(index),
                Some(slot) if slot.offset < offset => return None,
                Some(_) => {}
            }
            index = (index + 1) % capacity;
        }
        None
    }

    /// Places a key known to be absent.
    ///
    /// On `Err` the table is still consistent and the returned entry (which
    /// may be an evicted occupant rather than the one passed in) is the only
    /// one missing from it.
    fn place(&mut self, hash: u64, value: V) -> Result<(), (u64, V)> {
        let capacity = self.slots.len();
        let mut index = self.ideal(hash);
        let mut carried = Slot {
            hash,
            offset: 0,
            value,
        };
        loop {
            if carried.offset >= self.max_offset {
                return Err((carried.hash, carried.value));
            }
            let slot = &mut self.slots[index];
            match slot {
                None => {
                    *slot = Some(carried);
                    self.len += 1;
                    return Ok(());
                }
                Some(occupant) if occupant.offset < carried.offset => {
                    std::mem::swap(occupant, &mut carried);
                }
                Some(_) => {}
            }
            index = (index + 1) % capacity;
            carried.offset += 1;
        }
    }

    /// Grows until every current entry plus `pending` fits within the probe bound.
    fn grow_with(&mut self, pending: (u64, V)) {
        let mut entries = vec![pending];
        let mut capacity = self.slots.len();
        loop {
            capacity = grown(capacity);
            entries.extend(self.take_entries());
            self.slots = empty_slots(capacity);
            self.max_offset = max_offset_for(capacity);

            while let Some((hash, value)) = entries.pop() {
                if let Err(overflow) = self.place(hash, value) {
                    entries.push(overflow);
                    break;
                }
            }
            if entries.is_empty() {
                return;
            }
        }
    }

    fn take_entries(&mut self) -> Vec<(u64, V)> {
        self.len = 0;
        std::mem::take(&mut self.slots)
            .into_iter()
            .flatten()
            .map(|slot| (slot.hash, slot.value))
            .collect()
    }
}

impl Table<()> {
    /// Adds a bare key, returning `true` if it was already present.
    pub fn insert(&mut self, hash: u64) -> bool {
        self.add(hash, ())
    }
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for Table<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> FromIterator<(u64, V)> for Table<V> {
    fn from_iter<I: IntoIterator<Item = (u64, V)>>(iter: I) -> Self {
        let mut table = Table::new();
        table.extend(iter);
        table
    }
}

impl<V> Extend<(u64, V)> for Table<V> {
    fn extend<I: IntoIterator<Item = (u64, V)>>(&mut self, iter: I) {
        for (hash, value) in iter {
            self.add(hash, value);
        }
    }
}

fn empty_slots<V>(capacity: usize) -> Vec<Option<Slot<V>>> {
    (0..capacity).map(|_| None).collect()
}

/// `ceil(log2(capacity))`, never below 1.
fn max_offset_for(capacity: usize) -> u32 {
    let bits = usize::BITS - (capacity.saturating_sub(1)).leading_zeros();
    bits.max(1)
}

fn grown(capacity: usize) -> usize {
    (capacity + capacity / 2).max(capacity + 1)
}

/// SplitMix64 finalizer. Keys such as inode numbers are far from uniform.
fn spread(hash: u64) -> u64 {
    let mut z = hash;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashMap;

    /// Every occupant sits exactly `offset` slots past its ideal bucket, within
    /// the bound, and no probe sequence skips a poorer occupant.
    fn check_invariants<V>(table: &Table<V>) {
        let capacity = table.slots.len();
        let mut count = 0;
        for (index, slot) in table.slots.iter().enumerate() {
            let Some(slot) = slot else { continue };
            count += 1;
            assert!(slot.offset < table.max_offset, "offset beyond bound");
            let ideal = table.ideal(slot.hash);
            assert_eq!((ideal + slot.offset as usize) % capacity, index);
            assert!(table.has(slot.hash), "occupant unreachable by probe");
        }
        assert_eq!(count, table.len());
    }

    #[test]
    fn max_offset_is_ceil_log2() {
        assert_eq!(max_offset_for(8), 3);
        assert_eq!(max_offset_for(9), 4);
        assert_eq!(max_offset_for(12), 4);
        assert_eq!(max_offset_for(16), 4);
        assert_eq!(max_offset_for(17), 5);
        assert_eq!(max_offset_for(1), 1);
    }

    #[test]
    fn add_then_get() {
        let mut t = Table::new();
        assert!(!t.add(1, "one"));
        assert!(!t.add(2, "two"));
        assert_eq!(t.get(1), Some(&"one"));
        assert_eq!(t.get(2), Some(&"two"));
        assert_eq!(t.get(3), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn add_existing_overwrites() {
        let mut t = Table::new();
        assert!(!t.add(5, 10));
        assert!(t.add(5, 20));
        assert_eq!(t.get(5), Some(&20));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn remove_returns_value_and_forgets_key() {
        let mut t = Table::new();
        t.add(7, "seven");
        assert_eq!(t.remove(7), Some("seven"));
        assert!(!t.has(7));
        assert_eq!(t.remove(7), None);
        assert!(t.is_empty());
    }

    #[test]
    fn remove_keeps_neighbours_reachable() {
        let mut t = Table::new();
        for h in 0..200u64 {
            t.add(h, h * 3);
        }
        for h in (0..200u64).step_by(3) {
            assert_eq!(t.remove(h), Some(h * 3));
            check_invariants(&t);
        }
        for h in 0..200u64 {
            if h % 3 == 0 {
                assert!(!t.has(h));
            } else {
                assert_eq!(t.get(h), Some(&(h * 3)));
            }
        }
    }

    #[test]
    fn growth_never_loses_entries() {
        let mut t = Table::new();
        let initial = t.capacity();
        for h in 0..10_000u64 {
            t.add(h.wrapping_mul(0x9e37_79b9_7f4a_7c15), h);
        }
        assert!(t.capacity() > initial);
        assert_eq!(t.len(), 10_000);
        for h in 0..10_000u64 {
            assert_eq!(t.get(h.wrapping_mul(0x9e37_79b9_7f4a_7c15)), Some(&h));
        }
        check_invariants(&t);
    }

    #[test]
    fn max_offset_grows_with_capacity() {
        let mut t = KeySet::new();
        let before = t.max_offset();
        for h in 0..1_000 {
            t.insert(h);
        }
        assert!(t.max_offset() > before);
        assert_eq!(t.max_offset(), max_offset_for(t.capacity()));
    }

    #[test]
    fn clone_is_independent() {
        let mut a = Table::new();
        a.add(1, String::from("x"));
        a.add(2, String::from("y"));
        let mut b = a.clone();
        b.add(3, String::from("z"));
        b.remove(1);
        assert!(a.has(1));
        assert!(!a.has(3));
        assert!(!b.has(1));
        assert_eq!(b.get(2).map(String::as_str), Some("y"));
    }

    #[test]
    fn iteration_visits_every_entry_once() {
        let t: Table<u64> = (0..50u64).map(|h| (h, h)).collect();
        let mut seen: Vec<u64> = t.keys().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
        let first: Vec<u64> = t.keys().collect();
        let second: Vec<u64> = t.keys().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut t = Table::new();
        t.add(9, vec![1]);
        t.get_mut(9).unwrap().push(2);
        assert_eq!(t.get(9), Some(&vec![1, 2]));
    }

    #[test]
    fn clear_empties() {
        let mut t: KeySet = (0..20).map(|h| (h, ())).collect();
        t.clear();
        assert!(t.is_empty());
        assert!(!t.has(3));
        assert!(!t.insert(3));
    }

    #[test]
    fn full_table_removal_terminates() {
        let mut t = Table::with_capacity(8);
        let mut h = 0;
        while t.len() < t.capacity() && t.capacity() == 8 {
            t.add(h, h);
            h += 1;
        }
        let keys: Vec<u64> = t.keys().collect();
        for k in keys {
            assert_eq!(t.remove(k), Some(k));
            check_invariants(&t);
        }
        assert!(t.is_empty());
    }

    #[test]
    fn randomized_against_hashmap() {
        let mut rng = StdRng::seed_from_u64(0x6b69_6c6e);
        let mut table = Table::new();
        let mut model = HashMap::new();

        for step in 0..20_000u32 {
            let key = rng.gen_range(0..512u64);
            match rng.gen_range(0..10) {
                0..=5 => {
                    let existed = table.add(key, step);
                    assert_eq!(existed, model.insert(key, step).is_some());
                }
                6..=8 => {
                    assert_eq!(table.remove(key), model.remove(&key));
                }
                _ => {
                    assert_eq!(table.get(key), model.get(&key));
                    assert_eq!(table.has(key), model.contains_key(&key));
                }
            }
            assert_eq!(table.len(), model.len());
            if step % 1_000 == 0 {
                check_invariants(&table);
            }
        }

        for (key, value) in &model {
            assert_eq!(table.get(*key), Some(value));
        }
        check_invariants(&table);
    }
}
