// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for Gatehouse.
//!
//! This crate provides:
//! - A pre-configured HTTP client with a consistent User-Agent header
//! - [`RequestContext`], the per-request cancellation and deadline carried
//!   into every identity-provider call

mod client;
mod context;

pub use client::{builder, new_client_with_timeout, user_agent};
pub use context::{Interrupted, RequestContext};
