//! Serialization and deserialization of network packets.
//!
//! The `repr` module provides views over byte buffers and decoded header
//! representations for the Ethernet, ARP, IPv4 and ICMP layers. Every view
//! checks the buffer length up front so accessors never read out of bounds.

pub mod arp;
pub mod ethernet;
pub mod icmpv4;
pub mod ipv4;

pub use self::arp::{
    Arp,
    Op as ArpOp,
};
pub use self::ethernet::{
    eth_types,
    Address as EthernetAddress,
    Frame as EthernetFrame,
    Repr as EthernetRepr,
};
pub use self::icmpv4::{
    types as icmpv4_types,
    Echo as Icmpv4Echo,
    Message as Icmpv4Message,
    Packet as Icmpv4Packet,
};
pub use self::ipv4::{
    flags as ipv4_flags,
    protocols as ipv4_protocols,
    Address as Ipv4Address,
    AddressCidr as Ipv4AddressCidr,
    Packet as Ipv4Packet,
    Repr as Ipv4Repr,
};
