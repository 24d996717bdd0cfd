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

//! # probds
//!
//! Probabilistic data structures that answer set-membership queries approximately, trading a
//! tunable false positive rate for fixed, compact storage.
//!
//! This library is divided into modules that constitute distinct groups of functionality:
//!
//! - [`bloom`]: the Bloom filter and its builder
//! - [`hash`]: the seedless FNV-1a hash all structures derive positions from
//! - [`error`]: the error type shared by every fallible operation
//!
//! Structures are single-threaded. Mutation takes `&mut self`, so sharing one across threads
//! needs an external lock around `add` and `merge`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

mod approx;

pub mod bloom;
pub mod error;
pub mod hash;

pub use self::approx::ApproxStructure;
