// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Medibook - Medical Appointment Scheduling Service
//!
//! Backend for booking appointments between patients and doctors, gated by
//! a fail-open token authentication layer and a role authorization policy.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Authentication gate, authorization policy, tokens, passwords
//! - `store` - In-memory user directory and appointment table
//! - `reset` - Password reset code store
//! - `notify` - Outbound notification interface

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod reset;
pub mod state;
pub mod store;
