//! Test Module
//!
//! Cross-module test suite for the routing core.
//!
//! ## Test Categories
//! - `nlu_tests`: classification pipeline with scripted collaborators
//! - `wizard_tests`: multi-turn flow behavior against the wizard API
//! - `router_tests`: full conversations through `Router::route`

pub mod doubles;
pub mod nlu_tests;
