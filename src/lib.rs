//! Taskboard: a kanban task board with an append-only activity log.
//!
//! This crate keeps a board's task collection consistent across optimistic
//! local mutations, confirmation from a shared record store, and change
//! notifications pushed by other clients, and derives an immutable,
//! human-readable activity record from every confirmed mutation.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure values and state machines with no infrastructure
//!   dependencies
//! - **Ports**: Abstract trait interfaces for the record store and its change
//!   feed
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`board`]: Task lifecycle, relocation, inline editing, and activity audit
//! - [`config`]: Board configuration loaded from TOML
//! - [`logging`]: Tracing subscriber bootstrap

pub mod board;
pub mod config;
pub mod logging;
