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

use super::BloomFilter;
use crate::error::Error;

const MIN_NUM_BITS: u64 = 1;
const MAX_NUM_BITS: u64 = (1u64 << 35) - 64; // ~4 GiB of words

const MIN_SUGGESTED_BITS: u64 = 64;
const MAX_SUGGESTED_HASHES: u16 = 100;

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_size()`](Self::with_size): Specify exact bit count and hash count
/// - [`with_accuracy()`](Self::with_accuracy): Specify expected keys and target false positive
///   probability, and let the builder derive the parameters
///
/// Explicit [`num_bits()`](Self::num_bits) or [`num_hashes()`](Self::num_hashes) values always
/// win over derived ones. Parameters are validated in [`build()`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct BloomFilterBuilder {
    num_bits: Option<u64>,
    num_hashes: Option<u16>,
    accuracy: Option<(u64, f64)>,
}

impl BloomFilterBuilder {
    /// Creates a builder with optimal parameters for a target accuracy.
    ///
    /// # Arguments
    ///
    /// - `max_items`: Maximum expected number of distinct keys
    /// - `fpp`: Target false positive probability (e.g., 0.01 for 1%)
    ///
    /// `max_items` must be positive and `fpp` must lie strictly between 0 and 1, otherwise
    /// [`build()`](Self::build) fails.
    ///
    /// # Examples
    ///
    /// ```
    /// # use probds::bloom::BloomFilterBuilder;
    /// // Optimal for 10,000 keys with 1% FPP
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01).build().unwrap();
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Self {
        BloomFilterBuilder {
            num_bits: None,
            num_hashes: None,
            accuracy: Some((max_items, fpp)),
        }
    }

    /// Creates a builder with manual size specification.
    ///
    /// # Examples
    ///
    /// ```
    /// # use probds::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(10_000, 7).build().unwrap();
    /// assert_eq!(filter.capacity(), 10_000);
    /// ```
    pub fn with_size(num_bits: u64, num_hashes: u16) -> Self {
        BloomFilterBuilder {
            num_bits: Some(num_bits),
            num_hashes: Some(num_hashes),
            accuracy: None,
        }
    }

    /// Sets the number of addressable bits.
    pub fn num_bits(mut self, num_bits: u64) -> Self {
        self.num_bits = Some(num_bits);
        self
    }

    /// Sets the number of bit positions derived per key.
    pub fn num_hashes(mut self, num_hashes: u16) -> Self {
        self.num_hashes = Some(num_hashes);
        self
    }

    /// Builds the Bloom filter.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidCapacity`](crate::error::ErrorKind::InvalidCapacity) if:
    /// - the bit count or hash count is zero, or was never configured
    /// - the bit count exceeds the supported maximum
    /// - the accuracy target has zero `max_items` or an `fpp` outside `(0, 1)`
    pub fn build(self) -> Result<BloomFilter, Error> {
        let (num_bits, num_hashes) = self.resolve_params()?;
        validate_params(num_bits, num_hashes)?;

        debug!(num_bits, num_hashes, "built bloom filter");
        Ok(BloomFilter::with_params(num_bits, num_hashes))
    }

    fn resolve_params(&self) -> Result<(u64, u16), Error> {
        let Some((max_items, fpp)) = self.accuracy else {
            let num_bits = self
                .num_bits
                .ok_or_else(|| Error::invalid_capacity("number of bits is not configured"))?;
            let num_hashes = self
                .num_hashes
                .ok_or_else(|| Error::invalid_capacity("number of hashes is not configured"))?;
            return Ok((num_bits, num_hashes));
        };

        if max_items == 0 {
            return Err(Error::invalid_capacity("max_items must be greater than 0"));
        }
        if !(fpp > 0.0 && fpp < 1.0) {
            return Err(
                Error::invalid_capacity("fpp must be between 0.0 and 1.0 (exclusive)")
                    .with_context("fpp", fpp),
            );
        }

        let num_bits = self
            .num_bits
            .unwrap_or_else(|| Self::suggest_num_bits(max_items, fpp));
        let num_hashes = self
            .num_hashes
            .unwrap_or_else(|| Self::suggest_num_hashes_from_accuracy(max_items, num_bits));
        Ok((num_bits, num_hashes))
    }

    // ========================================================================
    // Static Suggestion Methods
    // ========================================================================

    /// Suggests optimal number of bits given max keys and target FPP.
    ///
    /// Formula: `m = -n * ln(p) / (ln(2)^2)`, rounded up to a multiple of 64
    /// where n = max_items, p = fpp
    ///
    /// # Examples
    ///
    /// ```
    /// # use probds::bloom::BloomFilterBuilder;
    /// let bits = BloomFilterBuilder::suggest_num_bits(1000, 0.01);
    /// assert_eq!(bits, 9600); // 9586 rounded up to whole words
    /// ```
    pub fn suggest_num_bits(max_items: u64, fpp: f64) -> u64 {
        let n = max_items as f64;
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;

        let bits = (-n * fpp.ln() / ln2_squared).ceil() as u64;

        bits.clamp(MIN_SUGGESTED_BITS, MAX_NUM_BITS).div_ceil(64) * 64
    }

    /// Suggests optimal number of hash functions given max keys and bit count.
    ///
    /// Formula: `k = (m/n) * ln(2)`
    /// where m = num_bits, n = max_items
    ///
    /// # Examples
    ///
    /// ```
    /// # use probds::bloom::BloomFilterBuilder;
    /// let hashes = BloomFilterBuilder::suggest_num_hashes_from_accuracy(1000, 10000);
    /// assert_eq!(hashes, 7); // Optimal k ≈ 6.93
    /// ```
    pub fn suggest_num_hashes_from_accuracy(max_items: u64, num_bits: u64) -> u16 {
        let m = num_bits as f64;
        let n = max_items as f64;

        let k = (m / n * std::f64::consts::LN_2).round();

        (k as u16).clamp(1, MAX_SUGGESTED_HASHES)
    }

    /// Suggests optimal number of hash functions from target FPP.
    ///
    /// Formula: `k = -log2(p)`
    ///
    /// # Examples
    ///
    /// ```
    /// # use probds::bloom::BloomFilterBuilder;
    /// let hashes = BloomFilterBuilder::suggest_num_hashes_from_fpp(0.01);
    /// assert_eq!(hashes, 7); // -log2(0.01) ≈ 6.64
    /// ```
    pub fn suggest_num_hashes_from_fpp(fpp: f64) -> u16 {
        let k = -fpp.log2();
        (k.round() as u16).clamp(1, MAX_SUGGESTED_HASHES)
    }
}

fn validate_params(num_bits: u64, num_hashes: u16) -> Result<(), Error> {
    if !(MIN_NUM_BITS..=MAX_NUM_BITS).contains(&num_bits) {
        return Err(Error::invalid_capacity(format!(
            "num_bits must be within [{MIN_NUM_BITS}, {MAX_NUM_BITS}]"
        ))
        .with_context("num_bits", num_bits));
    }
    if num_hashes == 0 {
        return Err(Error::invalid_capacity("num_hashes must be at least 1")
            .with_context("num_hashes", num_hashes));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_builder_with_accuracy() {
        let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build().unwrap();
        assert_eq!(filter.capacity(), 9600);
        assert_eq!(filter.num_hashes(), 7);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_builder_with_size() {
        let filter = BloomFilterBuilder::with_size(1024, 5).build().unwrap();
        assert_eq!(filter.capacity(), 1024);
        assert_eq!(filter.num_hashes(), 5);
    }

    #[test]
    fn test_explicit_values_override_accuracy() {
        let filter = BloomFilterBuilder::with_accuracy(1000, 0.01)
            .num_hashes(3)
            .build()
            .unwrap();
        assert_eq!(filter.capacity(), 9600);
        assert_eq!(filter.num_hashes(), 3);
    }

    #[test]
    fn test_unconfigured_builder_fails() {
        let err = BloomFilter::builder().num_bits(64).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCapacity);
        assert_eq!(err.message(), "number of hashes is not configured");
    }

    #[test]
    fn test_invalid_accuracy_fails() {
        for (max_items, fpp) in [(0, 0.01), (100, 0.0), (100, 1.0), (100, f64::NAN)] {
            let err = BloomFilterBuilder::with_accuracy(max_items, fpp)
                .build()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidCapacity);
        }
    }

    #[test]
    fn test_oversized_filter_fails() {
        let err = BloomFilterBuilder::with_size(MAX_NUM_BITS + 1, 3)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCapacity);
    }

    #[test]
    fn test_suggestions_are_clamped() {
        assert_eq!(BloomFilterBuilder::suggest_num_bits(1, 0.5), 64);
        assert_eq!(BloomFilterBuilder::suggest_num_hashes_from_fpp(0.9), 1);
        assert_eq!(
            BloomFilterBuilder::suggest_num_hashes_from_accuracy(1, 1 << 20),
            MAX_SUGGESTED_HASHES
        );
    }
}
