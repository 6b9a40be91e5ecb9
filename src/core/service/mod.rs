//! Packet processing services for different network layers.
//!
//! The `service` module deals with packet reception, forwarding and
//! transmission logic at different layers of the network stack. Frames enter
//! via `ethernet::recv_frame(...)` and run to completion; every function
//! returns either success or an `Error` naming why the packet was dropped.

pub mod arp;
pub mod ethernet;
pub mod icmpv4;
pub mod ipv4;

use crate::core::arp_cache::ArpCache;
use crate::core::dev::Device;
use crate::core::repr::{
    EthernetAddress,
    Ipv4Address,
    Ipv4AddressCidr,
    Ipv4Repr,
};
use crate::core::route_table::RouteTable;
use crate::core::InterfaceId;
use crate::Result;

/// A network attachment of the router.
pub struct Interface<D: Device> {
    /// Name of the interface, e.g. eth0.
    pub name: String,
    /// Device for sending and receiving raw Ethernet frames.
    pub dev: D,
    /// Ethernet address for the interface.
    pub ethernet_addr: EthernetAddress,
    /// IPv4 address and subnet for the interface. The unspecified address
    /// marks an unaddressed interface.
    pub ipv4_addr: Ipv4AddressCidr,
}

impl<D: Device> Interface<D> {
    pub fn new(
        name: &str,
        dev: D,
        ethernet_addr: EthernetAddress,
        ipv4_addr: Ipv4AddressCidr,
    ) -> Interface<D> {
        Interface {
            name: name.to_string(),
            dev,
            ethernet_addr,
            ipv4_addr,
        }
    }

    /// Checks if the interface has an IPv4 address assigned.
    pub fn is_addressed(&self) -> bool {
        !self.ipv4_addr.is_unspecified()
    }

    /// Returns the directed broadcast address of the interface subnet.
    pub fn broadcast(&self) -> Ipv4Address {
        self.ipv4_addr.broadcast()
    }
}

/// Receives packets addressed to the router for protocols handled outside
/// the routing core, i.e. TCP and UDP.
pub trait Transport {
    fn recv(&mut self, interface: InterfaceId, ipv4_repr: &Ipv4Repr, payload: &[u8]);
}

/// A transport which drops every packet.
#[derive(Debug, Default)]
pub struct DiscardTransport;

impl Transport for DiscardTransport {
    fn recv(&mut self, interface: InterfaceId, ipv4_repr: &Ipv4Repr, payload: &[u8]) {
        debug!(
            "Discarding {} byte(s) of protocol {} from {} on interface {}.",
            payload.len(),
            ipv4_repr.protocol,
            ipv4_repr.src_addr,
            interface
        );
    }
}

/// All state of the router: its interfaces, the routing table and the ARP
/// cache.
pub struct Router<D: Device> {
    pub interfaces: Vec<Interface<D>>,
    pub route_table: RouteTable,
    pub arp_cache: ArpCache,
    pub transport: Box<dyn Transport>,
}

impl<D: Device> Router<D> {
    /// Creates a router with a connected route for every addressed interface.
    pub fn new(interfaces: Vec<Interface<D>>) -> Result<Router<D>> {
        let mut route_table = RouteTable::new();

        for (i, interface) in interfaces.iter().enumerate() {
            if !interface.is_addressed() {
                info!("Interface {} has no IPv4 address.", interface.name);
                continue;
            }

            route_table.add_connected(&interface.ipv4_addr, i)?;
            info!(
                "Set directly connected route {}/{} via {}.",
                interface.ipv4_addr.network(),
                interface.ipv4_addr.prefix_len(),
                interface.name
            );
        }

        Ok(Router {
            interfaces,
            route_table,
            arp_cache: ArpCache::new(),
            transport: Box::new(DiscardTransport),
        })
    }

    /// Replaces the transport receiving TCP and UDP packets.
    pub fn with_transport<T: Transport + 'static>(mut self, transport: T) -> Router<D> {
        self.transport = Box::new(transport);
        self
    }

    /// Checks if an IPv4 address belongs to the router, i.e. it is the address
    /// or directed broadcast address of one of its addressed interfaces.
    pub fn is_router_addr(&self, addr: Ipv4Address) -> bool {
        self.interfaces
            .iter()
            .filter(|interface| interface.is_addressed())
            .any(|interface| *interface.ipv4_addr == addr || interface.broadcast() == addr)
    }
}
