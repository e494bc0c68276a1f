//! Task lifecycle synchronisation and activity audit for the board.
//!
//! The board keeps an in-memory task collection consistent across local
//! mutations (drag, swipe, edit, create, delete), confirmation or rejection
//! from a shared record store, and change notifications pushed by other
//! clients. Every confirmed mutation appends one human-readable activity
//! record. The module follows hexagonal architecture:
//!
//! - Domain types and pure state machines in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
