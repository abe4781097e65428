//! Application core — ports, typed commands, events, and the control loop.

pub mod commands;
pub mod events;
pub mod ports;
pub mod processor;
pub mod service;
