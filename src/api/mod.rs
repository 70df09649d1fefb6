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

//! Top-level engine API
//!
//! ```
//! use rpncalc::{Engine, EngineConfig};
//!
//! let mut engine = Engine::with_config(EngineConfig::from_params("stack_capacity=64")?);
//! engine.assign("x=2; y=x*3; z=y+1")?;
//! assert_eq!(engine.value("z"), Some(7.0));
//!
//! // fully constant input folds to one inlined constant
//! engine.compile("3+4*2")?;
//! assert_eq!(engine.program().as_constant(), Some(11.0));
//! # Ok::<(), rpncalc::Error>(())
//! ```

pub mod config;
pub mod engine;

pub use config::EngineConfig;
pub use engine::Engine;
