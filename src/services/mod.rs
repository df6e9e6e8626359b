// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Business logic services.

pub mod tokens;
pub mod users;

pub use tokens::{TokenError, TokenIssuer, TokenPair};
