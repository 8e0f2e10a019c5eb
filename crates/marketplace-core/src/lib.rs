//! Authorization core for the real-estate marketplace.
//!
//! Roles and their permission snapshots live in [`access`], credential resolution in [`auth`],
//! the listing approval workflow in [`listings`], and the process-local response cache in
//! [`cache`]. [`app::Marketplace`] wires them together behind the HTTP routers.

pub mod access;
pub mod accounts;
pub mod app;
pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod inquiries;
pub mod listings;
pub mod store;
pub mod telemetry;
pub mod validation;

pub use app::{marketplace_router, Marketplace};
