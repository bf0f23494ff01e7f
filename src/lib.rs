//! Reader for MESA-style simulation logs that undoes restarts.
//!
//! A run that restarts from an earlier checkpoint writes the same model
//! numbers again. [`data::load`] and [`data::resolve_profile_paths`] both
//! present the timeline of the final run only, leaving the files untouched.

pub mod data;
pub mod export;
