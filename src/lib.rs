//! Interactive provisioning for the dotsetup desktop environment.
//!
//! Resolves prerequisites, offers preset bundles of modules, keeps a set of
//! upstream repositories in sync, builds companion binaries, and deploys
//! configuration into the user's home.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: layered run configuration (defaults, TOML file, flags)
//! - **[`resources`]**: idempotent primitives (repository sync, deploys, packages, …)
//! - **[`tasks`]**: module installers wired to resources, plus prerequisites
//! - **[`dispatch`]**: the preset and language menu state machine
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod exec;
pub mod git;
pub mod logging;
pub mod presets;
pub mod prompt;
pub mod resources;
pub mod tasks;
