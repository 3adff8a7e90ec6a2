//! # homelink-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceHost`: read device snapshots, refresh, execute, subscribe to events
//!   - `KeyValueStore`: persisted session bookkeeping
//!   - `Uplink`: report state and request sync at the assistant cloud
//!   - `EventPublisher`: publish host events
//! - Define **driving/inbound ports** as use-case structs:
//!   - `Fulfillment`: SYNC / QUERY / EXECUTE / DISCONNECT orchestration
//!   - `StateReporter`: debounced state reports driven by host events
//!   - `SyncRequester`: immediate and delayed request-sync
//!   - `Session`: link token and agent user id bookkeeping
//! - Provide **in-process infrastructure** (event bus, in-memory store) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `homelink-domain` only (plus `tokio` for channels, timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod memory;
pub mod ports;
pub mod services;
