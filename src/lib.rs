//! Home Expense
//!
//! This crate keeps one CSV ledger of household expenses per calendar month,
//! with per-day and per-column totals that are recomputed on every change.

pub mod chart;
pub mod config;
pub mod core;
pub mod store;
