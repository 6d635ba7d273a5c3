//! Payroll Engine library crate.
//!
//! This crate exposes the payroll computation core (discount cascades,
//! bonus eligibility, per-employee payroll and multi-month aggregation)
//! and the API components as reusable modules.  External applications
//! may depend on the `payroll_engine` crate and call into
//! `engine::compute_payroll` and `aggregate::aggregate` directly or
//! embed the API via `api::router`.

pub mod money;
pub mod models;
pub mod discount;
pub mod bonus;
pub mod engine;
pub mod aggregate;
pub mod error;
pub mod source;
pub mod config;
pub mod api;

pub use aggregate::aggregate;
pub use discount::apply_cascade;
pub use engine::{compute_many, compute_payroll};
pub use error::PayrollError;
pub use money::Money;
