//! Orchestration logic: the event store and the batch generator.

pub mod generator;
pub mod store;

pub use generator::{ApprovalGate, AutoApprove, ConsoleGate, Generator, Providers};
pub use store::{EventStore, StoreError};
