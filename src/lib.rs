//! Channel Warden - Payment-Reviewed Gated Channel Access Control
//!
//! This crate implements the subscriber access-control core for a gated
//! channel: access requests move through a per-subscriber state machine,
//! a human reviewer approves or rejects them, and approval issues a
//! single-use invite credential that can later be revoked.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
