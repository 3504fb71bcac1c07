//! Chat boundary for blossom:
//! - **Events** (`events`) - inbound event types and the per-user
//!   serializing dispatcher
//! - **Commands** (`commands`) - text commands and the selection-payload
//!   grammar shared by rendering and parsing
//! - **Outbound** (`outbound`) - message rendering and the sink port
//! - **Transport** (`transport`) - the polling runner with reconnect
//!   policy; a no-op transport keeps the process runnable without a live
//!   chat binding
//!
//! The core engine never sees transport payloads; this crate lifts them
//! into `FlowEvent`s and renders `Reply` directives back out.

pub mod commands;
pub mod events;
pub mod outbound;
pub mod transport;
