// Copyright 2025 rpncalc Contributors
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

//! Common utilities
//!
//! - [`hash`] - FNV-1a with avalanche mixing for symbol buckets
//! - [`version`] - Package version and build commit

pub mod hash;
pub mod version;

pub use hash::{avalanche, bucket_of, fnv1a};
pub use version::{version_info, GIT_COMMIT, VERSION};
