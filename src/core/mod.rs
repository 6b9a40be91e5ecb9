//! Core, platform independent routing code.

pub mod arp_cache;
pub mod check;
pub mod dev;
pub mod repr;
pub mod route_table;
pub mod service;

/// Index of an interface in the router's interface list.
pub type InterfaceId = usize;
