//! Stack VM to Hack assembly translator.
//!
//! Provides the translator core, a reference simulator for the target machine,
//! and logging utilities.

pub mod emulator;
pub mod translator;
pub mod utils;
