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

//! String hashing for the symbol table
//!
//! FNV-1a over the name's bytes followed by an avalanche step, so that
//! names differing only in their last byte still spread across buckets
//! when the bucket count is a small power of two.

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Plain 64-bit FNV-1a
#[inline]
pub fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Avalanche mix: pre-mix with a shifted copy, multiply, fold the high half down.
#[inline(always)]
pub fn avalanche(hash: u64) -> u64 {
    let k = hash ^ (hash >> 16);
    let k = k.wrapping_mul(0x517cc1b727220a95);
    k ^ (k >> 32)
}

/// Bucket index for `name` in a table of `buckets` chains.
///
/// `buckets` must be non-zero.
#[inline]
pub fn bucket_of(name: &str, buckets: usize) -> usize {
    (avalanche(fnv1a(name.as_bytes())) % buckets as u64) as usize
}
