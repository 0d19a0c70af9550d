//! Core crate for qtranslate: wire types, configuration, history, and the
//! small lookup tables (translation profiles, speech languages) shared by
//! the provider layer and the CLI.

pub mod config;
pub mod history;
pub mod language;
pub mod profiles;
pub mod types;
pub mod utils;
