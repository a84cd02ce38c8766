//! Onboarding progress core for the client portal.
//!
//! This crate implements the event-driven heart of the onboarding portal:
//! the stage/subtask plan replacement transaction, the progress aggregator,
//! and the notification-coalescing batcher. HTTP routing, auth, and file
//! storage live in the surrounding application and talk to this core
//! through the `ports` traits.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
