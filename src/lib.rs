// Copyright 2026 The Hearth Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![deny(missing_debug_implementations, rust_2018_idioms, unused_imports)]

//! A multi-threaded HTTP caching proxy built over a bounded
//! dispatcher/worker thread pool.
//!
//! - [`pool`] — the general-purpose thread pool.
//! - [`http`] — HTTP/1.x method/version/status vocabulary and blocking
//!   request/response ingestion.
//! - [`proxy`] — the blacklist, cache, request handler, and scheduler
//!   that make up the proxy itself.
//! - [`error`] — the crate-wide error type and its HTTP status mapping.
//! - [`config`] — the CLI surface for the `proxy` binary.

pub mod config;
pub mod error;
pub mod http;
pub mod pool;
pub mod proxy;
