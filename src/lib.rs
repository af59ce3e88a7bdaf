//! Elasticsearch Curator repository resolver.
//!
//! Turns host facts (OS family, major release) and a handful of settings
//! into the yum or apt repository that ships Curator plus the package
//! directive that installs it, then converges the host to that plan.
//!
//! The public API is organised into these layers:
//!
//! - **[`facts`]**: host facts, injected or detected from `os-release`
//! - **[`config`]**: settings file, CLI overrides and validation
//! - **[`resolver`]**: pure mapping from facts and settings to a [`plan::Plan`]
//! - **[`resources`]**: idempotent `check + apply` primitives (repo files, packages)
//! - **[`apply`]**: dependency-ordered convergence of a plan
//! - **[`commands`]**: top-level subcommand orchestration (`plan`, `apply`, `facts`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod apply;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod facts;
pub mod logging;
pub mod plan;
pub mod resolver;
pub mod resources;
