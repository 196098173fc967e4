//! # Anchor Service Client
//!
//! Client for delegating device signatures to a remote anchor service over
//! HTTP. Deployments that keep private keys off the issuing host point this
//! client at the service that holds them; the rest of the stack only sees a
//! signature coming back.
//!
//! Every request carries a hard timeout. A stalled anchor surfaces as
//! [`AnchorError::Timeout`] instead of wedging credential issuance.

pub mod client;
pub mod config;

pub use client::{AnchorError, AnchorSigner};
pub use config::AnchorConfig;
