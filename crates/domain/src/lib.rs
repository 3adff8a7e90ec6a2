//! # homelink-domain
//!
//! Pure domain model for the homelink voice-assistant adapter.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers and error conventions
//! - Define **Devices** as read from the host (snapshot + declared capabilities)
//! - Define **Host commands and events** (what we ask the host to do, what it tells us)
//! - Define the **smart-home wire types** (SYNC, QUERY, EXECUTE, DISCONNECT, report state)
//! - Define the **Capability Registry**: per-device-type probe + query projections
//! - Define the **Command Table**: intent command id → host command translation
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod capability;
pub mod command;
pub mod device;
pub mod event;
pub mod smarthome;
