//! Test infrastructure for the tolmark reducer
//!
//! Provides step scripting, fixture loading and tree description helpers.

#![allow(dead_code)]

mod describe;
mod loader;
mod script;

pub use describe::describe;
pub use loader::{load_fixtures_by_name, FixtureStep, TestCase};
pub use script::Script;
