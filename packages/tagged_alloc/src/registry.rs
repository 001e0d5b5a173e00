//! The mapping from live addresses to their attribution records.

use std::collections::HashMap;

use crate::Address;

const ERR_TOTAL_OVERFLOW: &str =
    "total tracked bytes overflows usize - this indicates an unrealistic scenario";
const ERR_TOTAL_UNDERFLOW: &str =
    "total tracked bytes is smaller than a live record - the registry total is out of sync";

/// Attribution for one live block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllocationRecord {
    address: Address,
    tag: String,
    size: usize,
}

impl AllocationRecord {
    /// The address of the block this record describes.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// The tag supplied when the block was allocated.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The number of bytes requested from the underlying allocator, after rounding.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Registry of live allocations, keyed by address, with a running total of their sizes.
///
/// The total always equals the sum of the sizes of the records currently in the registry.
/// Iteration order is unspecified and may change as records come and go.
///
/// All operations require exclusive access. A host that shares a registry between threads
/// must treat every operation as part of one critical section.
#[derive(Debug, Default)]
pub struct AllocationRegistry {
    records: HashMap<Address, AllocationRecord>,
    total_bytes: usize,
}

impl AllocationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new block.
    ///
    /// If a record already exists at `address` it is replaced and the total is corrected
    /// accordingly. This does not happen when blocks are released before their address is
    /// reused.
    pub fn insert(&mut self, address: Address, tag: impl Into<String>, size: usize) {
        let record = AllocationRecord {
            address,
            tag: tag.into(),
            size,
        };

        if let Some(previous) = self.records.insert(address, record) {
            self.subtract(previous.size);
        }

        self.add(size);
    }

    /// Carries the record at `old` over to `new` with an updated size.
    ///
    /// If `new == old` the record is updated in place. Returns `false` without changing
    /// anything if there is no record at `old`.
    pub fn update_on_move(&mut self, old: Address, new: Address, new_size: usize) -> bool {
        if old == new {
            let Some(record) = self.records.get_mut(&old) else {
                return false;
            };

            let old_size = record.size;
            record.size = new_size;

            self.subtract(old_size);
            self.add(new_size);
            return true;
        }

        let Some(mut record) = self.records.remove(&old) else {
            return false;
        };

        self.subtract(record.size);

        record.address = new;
        record.size = new_size;

        if let Some(displaced) = self.records.insert(new, record) {
            self.subtract(displaced.size);
        }

        self.add(new_size);
        true
    }

    /// Removes the record at `address`, returning it if there was one.
    pub fn remove(&mut self, address: Address) -> Option<AllocationRecord> {
        let record = self.records.remove(&address)?;
        self.subtract(record.size);
        Some(record)
    }

    /// The record at `address`, if any.
    #[must_use]
    pub fn get(&self, address: Address) -> Option<&AllocationRecord> {
        self.records.get(&address)
    }

    /// The sum of the sizes of all live records.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// The number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no live records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the live records in registry order.
    pub fn entries(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.records.values()
    }

    fn add(&mut self, size: usize) {
        self.total_bytes = self
            .total_bytes
            .checked_add(size)
            .expect(ERR_TOTAL_OVERFLOW);
    }

    fn subtract(&mut self, size: usize) {
        self.total_bytes = self
            .total_bytes
            .checked_sub(size)
            .expect(ERR_TOTAL_UNDERFLOW);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    // Registry keys are only compared, never dereferenced, so arbitrary integers will do.
    fn address(value: usize) -> Address {
        Address::from_ptr(std::ptr::without_provenance_mut(value))
    }

    fn sum_of_sizes(registry: &AllocationRegistry) -> usize {
        registry.entries().map(AllocationRecord::size).sum()
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = AllocationRegistry::new();

        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.total_bytes(), 0);
        assert_eq!(registry.entries().count(), 0);
    }

    #[test]
    fn insert_adds_record_and_total() {
        let mut registry = AllocationRegistry::new();

        registry.insert(address(0x1000), "x", 128);

        assert_eq!(registry.total_bytes(), 128);
        let record = registry.get(address(0x1000)).unwrap();
        assert_eq!(record.tag(), "x");
        assert_eq!(record.size(), 128);
        assert_eq!(record.address(), address(0x1000));
    }

    #[test]
    fn insert_over_existing_address_replaces_record() {
        let mut registry = AllocationRegistry::new();

        registry.insert(address(0x1000), "first", 64);
        registry.insert(address(0x1000), "second", 16);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.total_bytes(), 16);
        assert_eq!(registry.get(address(0x1000)).unwrap().tag(), "second");
    }

    #[test]
    fn remove_subtracts_size() {
        let mut registry = AllocationRegistry::new();
        registry.insert(address(0x1000), "a", 16);
        registry.insert(address(0x2000), "b", 32);

        let removed = registry.remove(address(0x1000)).unwrap();

        assert_eq!(removed.tag(), "a");
        assert_eq!(registry.total_bytes(), 32);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(address(0x1000)).is_none());
    }

    #[test]
    fn remove_unknown_address_is_no_op() {
        let mut registry = AllocationRegistry::new();
        registry.insert(address(0x1000), "a", 16);

        assert!(registry.remove(address(0x2000)).is_none());

        assert_eq!(registry.total_bytes(), 16);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn update_on_move_relocates_record_with_tag() {
        let mut registry = AllocationRegistry::new();
        registry.insert(address(0x1000), "buffer", 64);

        assert!(registry.update_on_move(address(0x1000), address(0x2000), 128));

        assert!(registry.get(address(0x1000)).is_none());
        let record = registry.get(address(0x2000)).unwrap();
        assert_eq!(record.tag(), "buffer");
        assert_eq!(record.size(), 128);
        assert_eq!(record.address(), address(0x2000));
        assert_eq!(registry.total_bytes(), 128);
    }

    #[test]
    fn update_on_move_same_address_updates_in_place() {
        let mut registry = AllocationRegistry::new();
        registry.insert(address(0x1000), "buffer", 64);
        registry.insert(address(0x3000), "other", 8);

        assert!(registry.update_on_move(address(0x1000), address(0x1000), 256));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(address(0x1000)).unwrap().size(), 256);
        assert_eq!(registry.total_bytes(), 264);
    }

    #[test]
    fn update_on_move_can_shrink() {
        let mut registry = AllocationRegistry::new();
        registry.insert(address(0x1000), "buffer", 256);

        assert!(registry.update_on_move(address(0x1000), address(0x1000), 32));

        assert_eq!(registry.total_bytes(), 32);
    }

    #[test]
    fn update_on_move_without_record_changes_nothing() {
        let mut registry = AllocationRegistry::new();
        registry.insert(address(0x1000), "buffer", 64);

        assert!(!registry.update_on_move(address(0x5000), address(0x6000), 128));
        assert!(!registry.update_on_move(address(0x5000), address(0x5000), 128));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.total_bytes(), 64);
        assert!(registry.get(address(0x6000)).is_none());
    }

    #[test]
    fn total_matches_sum_through_mixed_operations() {
        let mut registry = AllocationRegistry::new();

        registry.insert(address(0x1000), "a", 16);
        assert_eq!(registry.total_bytes(), sum_of_sizes(&registry));

        registry.insert(address(0x2000), "b", 32);
        assert_eq!(registry.total_bytes(), sum_of_sizes(&registry));

        registry.update_on_move(address(0x1000), address(0x3000), 64);
        assert_eq!(registry.total_bytes(), sum_of_sizes(&registry));

        registry.update_on_move(address(0x2000), address(0x2000), 8);
        assert_eq!(registry.total_bytes(), sum_of_sizes(&registry));

        // Moving onto a live key displaces the record that was there.
        registry.update_on_move(address(0x3000), address(0x2000), 4);
        assert_eq!(registry.total_bytes(), sum_of_sizes(&registry));
        assert_eq!(registry.total_bytes(), 4);

        registry.remove(address(0x2000));
        assert_eq!(registry.total_bytes(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn entries_yields_every_record_once() {
        let mut registry = AllocationRegistry::new();
        registry.insert(address(0x1000), "a", 16);
        registry.insert(address(0x2000), "b", 32);
        registry.insert(address(0x3000), "c", 64);

        let mut tags: Vec<&str> = registry.entries().map(AllocationRecord::tag).collect();
        tags.sort_unstable();

        assert_eq!(tags, ["a", "b", "c"]);
    }
}
