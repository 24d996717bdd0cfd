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

//! Bloom Filter implementation for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! a key is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: If a key was added, `query()` will always return `true`
//! - **Possible false positives**: `query()` may return `true` for keys never added
//! - **Fixed size**: the bit array never grows, shrinks or gets cleared
//! - **Keys are bytes**: anything that is `AsRef<[u8]>` can be added
//!
//! # Usage
//!
//! ```rust
//! use probds::bloom::BloomFilter;
//!
//! let mut filter = BloomFilter::new(1024, 3).unwrap();
//!
//! filter.add("hello");
//! filter.add(b"bytes too");
//!
//! assert!(filter.query("hello")); // true - definitely added
//! assert!(!filter.query("world")); // false - never added
//!
//! println!("Capacity: {} bits", filter.capacity());
//! println!("Est. FPP: {:.4}%", filter.error_rate() * 100.0);
//! ```
//!
//! # Creating Filters
//!
//! ## By Size
//!
//! ```rust
//! # use probds::bloom::BloomFilter;
//! let filter = BloomFilter::new(
//!     95_851, // Number of bits
//!     7,      // Number of hash functions
//! )
//! .unwrap();
//! ```
//!
//! ## By Accuracy
//!
//! ```rust
//! # use probds::bloom::BloomFilterBuilder;
//! let filter = BloomFilterBuilder::with_accuracy(
//!     10_000, // Expected max keys
//!     0.01,   // Target false positive probability (1%)
//! )
//! .build()
//! .unwrap();
//! ```
//!
//! # Merging
//!
//! Filters with the same capacity and hash count can be merged; anything else is an
//! [`IncompatibleStructure`](crate::error::ErrorKind::IncompatibleStructure) error.
//!
//! ```rust
//! # use probds::bloom::BloomFilter;
//! let mut filter1 = BloomFilter::new(64, 2).unwrap();
//! let mut filter2 = BloomFilter::new(64, 2).unwrap();
//!
//! filter1.add("x");
//! filter2.add("y");
//!
//! filter1.merge(&filter2).unwrap();
//! assert!(filter1.query("x"));
//! assert!(filter1.query("y"));
//! ```
//!
//! # Implementation Details
//!
//! - Uses 64-bit FNV-1a for hashing, so results are stable across runs and platforms
//! - Implements double hashing (Kirsch-Mitzenmacher method) for k hash functions
//! - Bits packed in `u64` words
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"
//! - Kirsch and Mitzenmacher (2008). "Less Hashing, Same Performance: Building a Better Bloom
//!   Filter"

mod builder;
mod sketch;

pub use self::builder::BloomFilterBuilder;
pub use self::sketch::BloomFilter;
