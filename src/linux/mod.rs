//! Linux specific devices and interface discovery.

pub mod dev;
pub mod ifaces;
mod libc;
pub mod poll;
