// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Back Office API - admin console backend
//!
//! Every protected call passes a bearer-credential authentication gate and
//! a role-based authorization gate before it reaches a handler.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credential verification, identity resolution, role policies
//! - `storage` - Account stores (in-memory and JSON files)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod seed;
pub mod state;
pub mod storage;
