// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provider-neutral building blocks for Gatehouse identity providers.
//!
//! The gateway owns a [`Session`] per user and drives it through an
//! [`AuthProvider`]: resolve who the user is, check the access token is still
//! good, check group membership, and periodically refresh. Providers share
//! the [`AuthError`] taxonomy and the generic [`request_json`] and
//! [`validate_token`] collaborators.

mod error;
mod provider;
mod requests;
mod session;

pub use error::{AuthError, Result};
pub use provider::{AuthProvider, ProviderData};
pub use requests::{request_json, validate_token};
pub use session::Session;

pub use gatehouse_common_http::{Interrupted, RequestContext};
pub use gatehouse_common_secret::SecretString;
