//! # storefront-search
//!
//! Instant search and "did you mean" suggestions for an electronics
//! storefront, backed by a Typesense product index and, optionally, an LLM
//! for spelling correction.
//!
//! ## Architecture
//!
//! ```text
//!                         ┌──────────────┐
//!                         │  User Query  │
//!                         └──────┬───────┘
//!                                │
//!                ┌───────────────┴────────────────┐
//!                ▼                                ▼
//!      ┌───────────────────┐            ┌───────────────────┐
//!      │ Numeric expansion │            │  Candidate lookup │
//!      │  "16" → "16 16gb" │            │  (loose, 12 docs) │
//!      └─────────┬─────────┘            └─────────┬─────────┘
//!                │                                ▼
//!                ▼                      ┌───────────────────┐
//!      ┌───────────────────┐            │  Term extraction  │
//!      │  Primary search   │            │ + similarity score│
//!      │ (weighted fields, │            └─────────┬─────────┘
//!      │  tuned typos)     │                      │
//!      └─────────┬─────────┘          ≥2 terms >40? ──yes──► top 6
//!                │                                │ no
//!                │                                ▼
//!                │                      ┌───────────────────┐
//!                │                      │ LLM spell-correct │
//!                │                      │ (terms as context)│
//!                │                      └─────────┬─────────┘
//!                │                                ▼
//!                │                      ┌───────────────────┐
//!                │                      │ Merge, score, sort│
//!                │                      │ dedup, keep 6     │
//!                │                      └─────────┬─────────┘
//!                │                                │ (deadline-bounded)
//!                └───────────────┬────────────────┘
//!                                ▼
//!               { hits, found, page, perPage, suggestions }
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the index, LLM and server
//! - [`error`] - Typed failures at component seams
//! - [`models`] - Shared data types: `ProductDocument`, `SearchHit`, request/response types
//! - [`search`] - The `SearchIndex` seam, its Typesense client, and query shaping
//! - [`suggest::similarity`] - Heuristic lexical score in `[0, 100]`
//! - [`suggest::terms`] - Candidate term harvesting from matched documents
//! - [`suggest::synthesizer`] - Fast-path / LLM-assisted suggestion pipeline
//! - [`llm`] - LLM client seam, providers, and the spelling-correction prompt/parser
//! - [`cache`] - Injected TTL cache
//! - [`recommend`] - Related products for a product page
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod recommend;
pub mod search;
pub mod state;
pub mod suggest;
