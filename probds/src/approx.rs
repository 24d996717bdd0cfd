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

//! Capabilities shared by approximate set-membership structures.

use crate::error::Error;

/// An approximate structure that records keys and answers membership queries with one-sided
/// error.
///
/// `merge` accepts only another value of the same concrete type, so combining two different
/// kinds of structure is rejected by the compiler. Parameter mismatches between two values of
/// the same type are reported at runtime as
/// [`ErrorKind::IncompatibleStructure`](crate::error::ErrorKind::IncompatibleStructure).
///
/// # Examples
///
/// ```
/// use probds::ApproxStructure;
/// use probds::bloom::BloomFilter;
///
/// fn record_all<S: ApproxStructure>(structure: &mut S, keys: &[&str]) {
///     for key in keys {
///         structure.add(key.as_bytes());
///     }
/// }
///
/// let mut filter = BloomFilter::new(1024, 3).unwrap();
/// record_all(&mut filter, &["a", "b"]);
/// assert!(ApproxStructure::query(&filter, b"a"));
/// ```
pub trait ApproxStructure {
    /// Records `key` in the structure.
    fn add(&mut self, key: &[u8]);

    /// Returns `false` if `key` was definitely never added, `true` if it possibly was.
    fn query(&self, key: &[u8]) -> bool;

    /// Folds `other` into `self`.
    ///
    /// On error neither operand is modified.
    fn merge(&mut self, other: &Self) -> Result<(), Error>;

    /// Estimated probability that `query` answers `true` for a key that was never added.
    fn error_rate(&self) -> f64;
}
