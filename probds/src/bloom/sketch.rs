// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use tracing::debug;
use tracing::warn;

use super::BloomFilterBuilder;
use crate::approx::ApproxStructure;
use crate::error::Error;
use crate::hash::fnv1a;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides membership queries with:
/// - No false negatives (added keys always return `true`)
/// - Tunable false positive rate
/// - Constant space usage, fixed at construction
///
/// Keys are arbitrary byte sequences. Bit positions are derived from two FNV-1a hashes with
/// double hashing (Kirsch-Mitzenmacher), see [`BloomFilter::add`].
///
/// # Known limitations
///
/// - If the second base hash of a key is a multiple of the bit count, every derived position
///   collapses onto the first one and the key occupies a single bit.
/// - [`merge`](Self::merge) combines bits only; the insertion counter of `self` is left as is,
///   so [`error_rate`](Self::error_rate) underestimates saturation after a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    /// Number of bit positions touched per key (k)
    num_hashes: u16,
    /// Total number of bits in the filter (m)
    capacity_bits: u64,
    /// Count of bits set to 1 (for statistics)
    num_bits_set: u64,
    /// Count of add calls, duplicates included (n)
    num_inserted: u64,
    /// Bit array packed into u64 words
    /// Length = ceil(capacity_bits / 64)
    bit_array: Vec<u64>,
}

impl BloomFilter {
    /// Creates an empty filter with `num_bits` addressable bits and `num_hashes` positions per
    /// key.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidCapacity`](crate::error::ErrorKind::InvalidCapacity) if either
    /// parameter is zero or `num_bits` exceeds the supported maximum.
    ///
    /// # Examples
    ///
    /// ```
    /// use probds::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::new(1024, 3).unwrap();
    /// assert_eq!(filter.capacity(), 1024);
    /// assert!(BloomFilter::new(0, 3).is_err());
    /// ```
    pub fn new(num_bits: u64, num_hashes: u16) -> Result<Self, Error> {
        BloomFilterBuilder::with_size(num_bits, num_hashes).build()
    }

    /// Returns a builder for creating a Bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use probds::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::builder()
    ///     .num_bits(10_000)
    ///     .num_hashes(7)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn builder() -> BloomFilterBuilder {
        BloomFilterBuilder::default()
    }

    /// Allocates a zeroed filter. Parameters must already be validated.
    pub(super) fn with_params(num_bits: u64, num_hashes: u16) -> Self {
        debug_assert!(num_bits > 0 && num_hashes > 0);

        let num_words = num_bits.div_ceil(64) as usize;
        BloomFilter {
            num_hashes,
            capacity_bits: num_bits,
            num_bits_set: 0,
            num_inserted: 0,
            bit_array: vec![0u64; num_words],
        }
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether a key is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Key was **possibly** added (or false positive)
    /// - `false`: Key was **definitely not** added
    ///
    /// # Examples
    ///
    /// ```
    /// # use probds::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(1024, 3).unwrap();
    /// filter.add("hello");
    ///
    /// assert!(filter.query("hello"));
    /// assert!(!filter.query("world"));
    /// ```
    pub fn query<K: AsRef<[u8]>>(&self, key: K) -> bool {
        if self.is_empty() {
            return false;
        }

        let (h1, h2) = Self::compute_hash(key.as_ref());
        self.check_bits(h1, h2)
    }

    /// Tests and adds a key in a single operation.
    ///
    /// Returns whether the key was possibly already in the set before this call. Hashes the key
    /// once instead of twice as separate `query()` and `add()` calls would.
    ///
    /// # Examples
    ///
    /// ```
    /// # use probds::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(1024, 3).unwrap();
    ///
    /// assert!(!filter.contains_and_add("apple"));
    /// assert!(filter.contains_and_add("apple"));
    /// assert_eq!(filter.num_inserted(), 2);
    /// ```
    pub fn contains_and_add<K: AsRef<[u8]>>(&mut self, key: K) -> bool {
        let (h1, h2) = Self::compute_hash(key.as_ref());
        let was_present = self.check_bits(h1, h2);
        self.set_bits(h1, h2);
        self.num_inserted += 1;
        was_present
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Adds a key to the filter.
    ///
    /// With `h1 = fnv1a(key)` and `h2 = fnv1a(h1.to_le_bytes())`, sets the bits at
    /// `(h1 + i * h2) mod capacity` for `i` in `0..num_hashes`. Adding the same key again sets
    /// no new bits but still counts as an insertion.
    ///
    /// # Examples
    ///
    /// ```
    /// # use probds::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(1024, 3).unwrap();
    ///
    /// filter.add("apple");
    /// filter.add(b"raw bytes");
    /// filter.add(42_u64.to_le_bytes());
    ///
    /// assert!(filter.query("apple"));
    /// ```
    pub fn add<K: AsRef<[u8]>>(&mut self, key: K) {
        let (h1, h2) = Self::compute_hash(key.as_ref());
        self.set_bits(h1, h2);
        self.num_inserted += 1;
    }

    // ========================================================================
    // Set Operations
    // ========================================================================

    /// Merges another filter into this one via bitwise OR (union).
    ///
    /// After merging, this filter recognizes keys from either filter (plus any false positives
    /// from either). The insertion counter of `self` is not changed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleStructure`](crate::error::ErrorKind::IncompatibleStructure)
    /// if the filters differ in capacity or hash count. Neither filter is modified in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// # use probds::bloom::BloomFilter;
    /// let mut f1 = BloomFilter::new(64, 2).unwrap();
    /// let mut f2 = BloomFilter::new(64, 2).unwrap();
    ///
    /// f1.add("x");
    /// f2.add("y");
    ///
    /// f1.merge(&f2).unwrap();
    /// assert!(f1.query("x"));
    /// assert!(f1.query("y"));
    ///
    /// let other = BloomFilter::new(128, 2).unwrap();
    /// assert!(f1.merge(&other).is_err());
    /// ```
    pub fn merge(&mut self, other: &BloomFilter) -> Result<(), Error> {
        if !self.is_compatible(other) {
            warn!(
                capacity = self.capacity_bits,
                num_hashes = self.num_hashes,
                other_capacity = other.capacity_bits,
                other_num_hashes = other.num_hashes,
                "rejected merge of incompatible bloom filters"
            );
            return Err(
                Error::incompatible_structure("cannot merge bloom filters with different parameters")
                    .with_context("capacity", self.capacity_bits)
                    .with_context("num_hashes", self.num_hashes)
                    .with_context("other_capacity", other.capacity_bits)
                    .with_context("other_num_hashes", other.num_hashes),
            );
        }

        for (word, other_word) in self.bit_array.iter_mut().zip(&other.bit_array) {
            *word |= *other_word;
        }

        self.recount_bits_set();
        debug!(
            capacity = self.capacity_bits,
            bits_used = self.num_bits_set,
            "merged bloom filter"
        );
        Ok(())
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether the filter is empty (no bit set).
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns the number of bits set to 1.
    ///
    /// Useful for monitoring filter saturation.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the total number of bits in the filter (capacity).
    pub fn capacity(&self) -> u64 {
        self.capacity_bits
    }

    /// Returns the number of bit positions derived per key.
    pub fn num_hashes(&self) -> u16 {
        self.num_hashes
    }

    /// Returns the number of add calls made on this filter, duplicates included.
    pub fn num_inserted(&self) -> u64 {
        self.num_inserted
    }

    /// Returns the current load factor (fraction of bits set).
    pub fn load_factor(&self) -> f64 {
        self.num_bits_set as f64 / self.capacity_bits as f64
    }

    /// Estimates the current false positive probability.
    ///
    /// Based on the formula: `(1 - e^(-k*n/m))^k`
    /// where:
    /// - k = num_hashes
    /// - n = num_inserted
    /// - m = capacity
    ///
    /// This assumes uniform bit placement and does not look at the bit array. It never
    /// decreases as keys are added, and is `0.0` for a filter nothing was added to.
    ///
    /// # Examples
    ///
    /// ```
    /// # use probds::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(1024, 3).unwrap();
    /// assert_eq!(filter.error_rate(), 0.0);
    ///
    /// filter.add("hello");
    /// assert!(filter.error_rate() > 0.0);
    /// ```
    pub fn error_rate(&self) -> f64 {
        let k = self.num_hashes as f64;
        let n = self.num_inserted as f64;
        let m = self.capacity_bits as f64;

        (1.0 - (-k * n / m).exp()).powf(k)
    }

    /// Checks if two filters are compatible for merging.
    ///
    /// Filters are compatible if they have the same:
    /// - Capacity (number of bits)
    /// - Number of hash functions
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.capacity_bits == other.capacity_bits && self.num_hashes == other.num_hashes
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Computes the two base hash values. The second hashes the little-endian bytes of the first.
    fn compute_hash(key: &[u8]) -> (u64, u64) {
        let h1 = fnv1a(key);
        let h2 = fnv1a(&h1.to_le_bytes());
        (h1, h2)
    }

    /// Checks if all k bits are set for the given hash values.
    fn check_bits(&self, h1: u64, h2: u64) -> bool {
        (0..self.num_hashes).all(|i| self.get_bit(self.compute_bit_index(h1, h2, i)))
    }

    /// Sets all k bits for the given hash values.
    fn set_bits(&mut self, h1: u64, h2: u64) {
        for i in 0..self.num_hashes {
            let bit_index = self.compute_bit_index(h1, h2, i);
            self.set_bit(bit_index);
        }
    }

    /// Computes a bit index using double hashing (Kirsch-Mitzenmacher).
    /// Formula: (h1 + i * h2) mod capacity_bits
    fn compute_bit_index(&self, h1: u64, h2: u64, i: u16) -> u64 {
        let hash = h1.wrapping_add(u64::from(i).wrapping_mul(h2));
        hash % self.capacity_bits
    }

    /// Gets the value of a single bit.
    fn get_bit(&self, bit_index: u64) -> bool {
        let word_index = (bit_index / 64) as usize;
        let mask = 1u64 << (bit_index % 64);
        (self.bit_array[word_index] & mask) != 0
    }

    /// Sets a single bit and updates the count if it wasn't already set.
    fn set_bit(&mut self, bit_index: u64) {
        let word_index = (bit_index / 64) as usize;
        let mask = 1u64 << (bit_index % 64);

        if (self.bit_array[word_index] & mask) == 0 {
            self.bit_array[word_index] |= mask;
            self.num_bits_set += 1;
        }
    }

    /// Recounts all set bits (used after merge).
    fn recount_bits_set(&mut self) {
        self.num_bits_set = self
            .bit_array
            .iter()
            .map(|word| word.count_ones() as u64)
            .sum();
    }
}

impl ApproxStructure for BloomFilter {
    fn add(&mut self, key: &[u8]) {
        BloomFilter::add(self, key);
    }

    fn query(&self, key: &[u8]) -> bool {
        BloomFilter::query(self, key)
    }

    fn merge(&mut self, other: &Self) -> Result<(), Error> {
        BloomFilter::merge(self, other)
    }

    fn error_rate(&self) -> f64 {
        BloomFilter::error_rate(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_allocates_rounded_words() {
        let filter = BloomFilter::new(65, 2).unwrap();
        assert_eq!(filter.capacity(), 65);
        assert_eq!(filter.bit_array.len(), 2);

        let filter = BloomFilter::new(1, 1).unwrap();
        assert_eq!(filter.bit_array.len(), 1);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_new_rejects_zero_parameters() {
        let err = BloomFilter::new(0, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCapacity);

        let err = BloomFilter::new(1024, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCapacity);
    }

    #[test]
    fn test_bit_indices_follow_double_hashing() {
        let mut filter = BloomFilter::new(1024, 3).unwrap();
        filter.add("hello");

        let (h1, h2) = BloomFilter::compute_hash(b"hello");
        assert_eq!(h1, 0xa430d84680aabd0b);
        assert_eq!(h2, 0x8f110372c6a6cb05);

        for bit in [267, 16, 789] {
            assert!(filter.get_bit(bit), "bit {bit} should be set");
        }
        assert_eq!(filter.bits_used(), 3);
    }

    #[test]
    fn test_add_and_query() {
        let mut filter = BloomFilter::new(1024, 3).unwrap();

        assert!(!filter.query("hello"));
        filter.add("hello");
        assert!(filter.query("hello"));
        assert!(!filter.query("world"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_duplicate_add_counts_insertions_only() {
        let mut filter = BloomFilter::new(1024, 3).unwrap();
        filter.add("hello");
        let snapshot = filter.bit_array.clone();

        filter.add("hello");
        assert_eq!(filter.bit_array, snapshot);
        assert_eq!(filter.num_inserted(), 2);
        assert_eq!(filter.bits_used(), 3);
    }

    #[test]
    fn test_padding_bits_stay_clear() {
        let mut filter = BloomFilter::new(70, 4).unwrap();
        for i in 0..500 {
            filter.add(format!("key-{i}"));
        }
        let padding_mask = !((1u64 << 6) - 1);
        assert_eq!(filter.bit_array[1] & padding_mask, 0);
        assert!(filter.bits_used() <= 70);
    }

    #[test]
    fn test_degenerate_second_hash_uses_one_bit() {
        // fnv1a of the h1 bytes of "key-46" is a multiple of 64
        let (h1, h2) = BloomFilter::compute_hash(b"key-46");
        assert_eq!(h2 % 64, 0);

        let mut filter = BloomFilter::new(64, 3).unwrap();
        filter.add("key-46");
        assert_eq!(filter.bits_used(), 1);
        assert!(filter.get_bit(h1 % 64));
        assert!(filter.query("key-46"));
    }

    #[test]
    fn test_merge() {
        let mut f1 = BloomFilter::new(64, 2).unwrap();
        let mut f2 = BloomFilter::new(64, 2).unwrap();

        f1.add("x");
        f2.add("y");

        f1.merge(&f2).unwrap();
        assert!(f1.query("x"));
        assert!(f1.query("y"));
        assert_eq!(f1.bits_used(), 4);
        // bits only, the counter is untouched
        assert_eq!(f1.num_inserted(), 1);
    }

    #[test]
    fn test_merge_incompatible_leaves_operands_untouched() {
        let mut f1 = BloomFilter::new(64, 2).unwrap();
        let mut f2 = BloomFilter::new(64, 3).unwrap();
        f1.add("x");
        f2.add("y");
        let (before1, before2) = (f1.clone(), f2.clone());

        let err = f1.merge(&f2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleStructure);
        assert_eq!(f1, before1);
        assert_eq!(f2, before2);
    }

    #[test]
    fn test_error_rate_formula() {
        let mut filter = BloomFilter::new(1000, 4).unwrap();
        for i in 0..100 {
            filter.add(format!("item-{i}"));
        }
        let expected = (1.0 - (-4.0 * 100.0 / 1000.0_f64).exp()).powi(4);
        assert!((filter.error_rate() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_load_factor() {
        let mut filter = BloomFilter::new(1024, 3).unwrap();
        assert_eq!(filter.load_factor(), 0.0);
        filter.add("hello");
        assert_eq!(filter.load_factor(), 3.0 / 1024.0);
    }

    #[test]
    fn test_trait_dispatch_matches_inherent() {
        fn fill<S: ApproxStructure>(structure: &mut S) {
            structure.add(b"alpha");
            structure.add(b"beta");
        }

        let mut filter = BloomFilter::new(512, 3).unwrap();
        fill(&mut filter);
        assert!(ApproxStructure::query(&filter, b"alpha"));
        assert!(filter.query("beta"));
        assert_eq!(ApproxStructure::error_rate(&filter), filter.error_rate());
    }
}
