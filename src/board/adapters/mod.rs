//! Adapters for the board's record store port.
//!
//! - [`memory::InMemoryRecordStore`]: thread-safe in-memory tables with a
//!   broadcast change feed and failure injection for tests
//! - [`rows`]: column layouts and conversions between stored records and
//!   domain types

pub mod memory;
pub mod rows;
