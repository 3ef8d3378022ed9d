//! Bearer tokens for the HTTP and WebSocket surfaces.

pub mod jwt;
