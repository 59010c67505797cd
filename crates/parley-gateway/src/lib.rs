//! # parley-gateway
//!
//! Realtime gateway speaking a length-prefixed binary protocol over
//! WebSocket. Owns the per-connection read/write pumps, the session
//! registry, request dispatch, and scoped broadcast fan-out.

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::run;
