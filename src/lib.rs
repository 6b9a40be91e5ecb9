#[cfg(test)]
#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod core;

#[cfg(target_os = "linux")]
pub mod linux;

use crate::core::repr::Ipv4Address;

#[derive(Debug)]
pub enum Error {
    /// Indicates a buffer shorter than the header it should contain.
    TooShort,
    /// Indicates an IPv4 header carrying options.
    UnsupportedOption,
    /// Indicates an error where a packet or frame is malformed.
    Malformed,
    /// Indicates a frame or packet that was filtered and not processed.
    Ignored,
    /// Indicates a packet received on an interface without an IPv4 address.
    Unaddressed,
    /// Indicates there is no route to an address.
    NoRoute(Ipv4Address),
    /// Indicates an address without an Ethernet mapping. An ARP request has
    /// been sent and the packet dropped.
    MacResolution(Ipv4Address),
    /// Indicates a next hop which is not on a directly connected network.
    Unreachable(Ipv4Address),
    /// Indicates a packet whose TTL ran out before it could be forwarded.
    TtlExpired,
    /// Indicates an error where a buffer, device, etc. is full or empty.
    Exhausted,
    /// Indicates a generic IO error.
    Io(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
