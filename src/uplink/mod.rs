//! Coordinator uplink — wire format and the HTTP(S) reporting client.

pub mod http;
pub mod wire;
