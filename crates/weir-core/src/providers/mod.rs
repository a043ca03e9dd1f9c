//! In-tree provider implementations
//!
//! The wire-protocol integrations live in their own crates and register
//! with the [`HandlerRegistry`](crate::registry::HandlerRegistry); only
//! providers with no wire protocol of their own ship here.

pub mod human_relay;

pub use human_relay::{HumanRelayHandler, RelayRequest};
