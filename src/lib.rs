//! rowcheck_service: "can I row today?" for the Thames at Reading.
//!
//! # Module structure
//!
//! ```text
//! rowcheck_service
//! ├── model     — shared data types (Reading, AdvisoryTier, Advisory, FetchError, …)
//! ├── config    — service configuration loader (rowcheck.toml)
//! ├── cache     — single-slot reading cache with injectable source and clock
//! ├── advisory  — flow thresholds → advisory tier + spoken message
//! ├── ingest
//! │   ├── ea    — Environment Agency measure API: HTTP fetch + JSON parsing
//! │   └── fixtures (test only) — representative API response payloads
//! ├── skill     — voice-platform request envelope dispatch
//! └── endpoint  — HTTP API exposing the skill, the advisory and a health check
//! ```

// Public modules
pub mod advisory;
pub mod cache;
pub mod config;
pub mod endpoint;
pub mod ingest;
pub mod model;
pub mod skill;
