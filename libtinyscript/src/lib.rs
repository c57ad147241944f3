#![doc = include_str!("../README.md")]

//   Copyright 2025 TinyScript Verifier Contributors
//
//   Licensed under the Apache License, Version 2.0 (the "License");
//   you may not use this file except in compliance with the License.
//   You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
//   Unless required by applicable law or agreed to in writing, software
//   distributed under the License is distributed on an "AS IS" BASIS,
//   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//   See the License for the specific language governing permissions and
//   limitations under the License.

pub mod ast;
pub mod boxmod;
pub mod encode;
mod error;
pub mod interpreter;
mod lexer;
pub mod parser;
pub mod policy;
pub mod printer;
pub mod vars;

pub mod driver;

pub use driver::CheckResult;
pub use error::{Error, Result};
