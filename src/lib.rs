//! LedgerChain - an append-only, hash-linked ledger kept in a single JSON file
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Block model, chain verification, append and lookup
//! - [`clock`] - Timestamp sources for new blocks
//!
//! ## State Management
//! - [`persistence`] - Store trait, atomic JSON file store, in-memory store
//!
//! ## Integration
//! - [`api`] - HTTP API (feature `api`)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`cli`] - CLI utilities

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod clock;

// ============================================================================
// State Management
// ============================================================================
pub mod persistence;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;
