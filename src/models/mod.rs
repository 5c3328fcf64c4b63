// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod cat;
pub mod user;
pub mod weight;

pub use cat::{Cat, Collaborator, Gender};
pub use user::User;
pub use weight::{weight_summary, WeightRecord, WeightSummary};
