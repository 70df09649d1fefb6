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

//! Version information for rpncalc

/// Package version in semver format
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash at build time, set by the build script
pub const GIT_COMMIT: &str = match option_env!("RPNCALC_GIT_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};

/// Cargo profile the crate was built with
pub const BUILD_PROFILE: &str = match option_env!("RPNCALC_BUILD_PROFILE") {
    Some(profile) => profile,
    None => "unknown",
};

/// Returns version info as a formatted string
pub fn version_info() -> String {
    format!(
        "rpncalc {} (commit: {}, {} build)",
        VERSION, GIT_COMMIT, BUILD_PROFILE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(version_info().starts_with("rpncalc "));
        assert!(version_info().contains(VERSION));
        assert!(!GIT_COMMIT.is_empty());
        assert!(version_info().ends_with(&format!("{} build)", BUILD_PROFILE)));
    }
}
