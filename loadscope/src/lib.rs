//! # loadscope - Loader Hierarchy Observer
//!
//! loadscope passively records every loader a process uses to bring code into
//! scope, rebuilds the parent/child hierarchy among them on demand, and renders
//! it as a tree, optionally with per-loader detail and liveness probes for
//! loaders that proxy remote code sources.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Host Process                             │
//! │             (loaders, each knowing only its parent)             │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ observations (Registry::record)
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    loadscope (This Crate)                       │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │   Registry   │──▶│  Hierarchy   │──▶│   Renderer   │──▶ text │
//! │  │ (Weak refs)  │   │   Builder    │   │ (+ probes)   │         │
//! │  └──────────────┘   └──────┬───────┘   └──────────────┘         │
//! │                            │ Forest::find                       │
//! │                            ▼                                    │
//! │                     ┌──────────────┐                            │
//! │                     │  Inspectors  │──▶ text                    │
//! │                     └──────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`domain`]: `Loader` capability trait, identities, errors
//! - [`registry`]: weakly-held, identity-keyed set of observed loaders
//! - [`hierarchy`]: forest reconstruction and tree rendering
//! - [`inspect`]: kind-specific detail extraction and liveness probes
//! - [`monitor`]: the four read-only management operations
//! - [`replay`]: recorded host adapter used as observation source by the CLI
//! - [`cli`]: command-line argument parsing
//!
//! ## Typical Usage
//!
//! ```bash
//! loadscope --host host.json tree
//! loadscope --host host.json tree --ping --timeout 10
//! loadscope --host host.json details 1234
//! ```
//!
//! ## Key Concepts
//!
//! - **Synthetic root**: the `Bootstrap` line, standing for "no parent"
//! - **Excluded kinds**: high-churn reflection-support loaders, dropped at build
//!   time with their children re-attached to the nearest surviving ancestor
//! - **Liveness**: `[+]` alive, `[-]` unreachable, `[?]` indeterminate

// Expose modules for testing
pub mod cli;
pub mod domain;
pub mod hierarchy;
pub mod inspect;
pub mod monitor;
pub mod registry;
pub mod replay;
