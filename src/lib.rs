//! # stack-sync
//!
//! A command-line tool for selectively syncing files from a source snapshot
//! (a checked-out repository) into a local target directory.
//!
//! ## Overview
//!
//! `stack-sync` scans the source tree under include/exclude glob rules, lets
//! the operator pick exactly which files move, copies (or, in diff mode,
//! deletes) them in the target tree, and records every attempt in a capped
//! JSON history log.
//!
//! ## Key Features
//!
//! - **Pattern rules**: base-name globs, path globs and `*.ext` shorthands, with exclusion first
//! - **Diff preview**: added/modified/deleted classification with per-file unified diffs
//! - **Selection modes**: keyboard viewport, number/range text, keyword filter, diff toggle list
//! - **Auditable history**: every applied or failed attempt is recorded, cancellations never are
//! - **Post-sync commands**: ordered shell commands after each successful sync
//!
//! ## Architecture
//!
//! The pipeline runs Scan/Diff → Select → Apply → Log:
//!
//! - Matching and enumeration ([`filter`], [`scanner`], [`diff`])
//! - Operator selection ([`select`])
//! - Application and recording ([`apply`], [`history`])
//! - Orchestration ([`sync`]) driven by [`handlers`] from the binary
//! - Configuration and logging ([`config`], [`repository`], [`logger`])

/// Change Applier: copies and removals against the target tree.
///
/// Every file actually acted on yields a [`apply::FileChange`] with its size.
/// The first failing file stops application; earlier changes are kept and
/// reported inside the error.
pub mod apply;

/// Platform-agnostic configuration directory management.
///
/// Locates `config.toml`, `history.json` and `stack-sync.log` following
/// platform conventions (XDG on Linux, Application Support on macOS,
/// AppData on Windows), overridable with `STACK_SYNC_HOME`.
pub mod config;

/// Tree Diff Engine and per-file diff rendering.
pub mod diff;

/// Typed errors for selection parsing and change application.
pub mod error;

/// Pattern Matcher: include/exclude glob rules over relative paths.
pub mod filter;

/// Command handlers behind the `stack-sync` subcommands.
pub mod handlers;

/// Capped, most-recent-first history of sync attempts.
pub mod history;

/// Logging configuration and utilities.
///
/// Sets up console logging (configurable via `RUST_LOG`) and a persistent
/// log file in the config directory, rotated once it exceeds 10MB.
pub mod logger;

/// Repository profiles loaded from `config.toml`.
pub mod repository;

/// Tree Scanner: deterministic depth-first enumeration of candidate files.
pub mod scanner;

/// Interactive Selector: mode prompt, keyboard, number, keyword and toggle-list modes.
pub mod select;

/// Sync orchestration of one attempt, from scan to history entry.
pub mod sync;
