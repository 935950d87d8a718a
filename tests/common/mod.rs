//! Common test utilities for tscp CLI tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated project and home directories plus helpers to run tscp
//! - Fixtures: Reusable tsconfig and settings content

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
