//! # Itemsift Architecture
//!
//! Itemsift is a **filter engine for item catalogs**. A search box query is
//! split into tokens; filters claim the tokens they understand as *tags* and
//! temporarily override their state, and whatever is left is matched as plain
//! text. The CLI is one client of the engine, not the point of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - ItemSearch: catalog + standard filter set                │
//! │  - Turns "only unique" / "patch 3.1" into filter edits      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (filters/, query.rs, filter_set.rs)                 │
//! │  - Generic over the record type                             │
//! │  - Tag claiming, per-record checks, change polling          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Data (catalog.rs, attributes.rs, model.rs)                 │
//! │  - Records, races, equip rules, named attribute accessors   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persistent vs. tag state
//!
//! Every filter keeps two states. The *persistent* one is what the user set
//! through the filter's editor and survives across queries. The *tag* one is
//! set while parsing a query and wins while present. Each parse pass starts
//! by clearing all tag state, so removing a tag from the query restores the
//! persistent state exactly.
//!
//! ## Failure policy
//!
//! No engine error aborts a query. A misconfigured filter or a failed lookup
//! is logged and the filter lets the record through.
//!
//! ## Module Overview
//!
//! - [`api`]: The `ItemSearch` facade
//! - [`filters`]: The filter contract and the boolean, patch and race/sex filters
//! - [`query`]: Tokenizing and tag routing
//! - [`filter_set`]: The ordered filter collection and evaluation
//! - [`attributes`]: Named boolean accessors
//! - [`catalog`]: The JSON item catalog
//! - [`model`]: Core data types (`Item`, `Race`, `Sex`)
//! - [`viewer`]: Opening items on external data sites
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod attributes;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter_set;
pub mod filters;
pub mod model;
pub mod query;
pub mod viewer;
