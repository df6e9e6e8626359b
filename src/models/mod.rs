// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod holding;
pub mod user;

pub use holding::{Holding, HoldingInput, HoldingInputError, HoldingsSummary};
pub use user::{LoginRequest, RegistrationRequest, User, UserProfile, UserUpdate};
