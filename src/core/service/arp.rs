use crate::core::dev::Device;
use crate::core::repr::{
    eth_types,
    Arp,
    ArpOp,
    EthernetAddress,
    Ipv4Address,
};
use crate::core::service::{
    ethernet,
    Router,
};
use crate::core::InterfaceId;
use crate::{
    Error,
    Result,
};

/// Sends an ARP packet via an interface.
pub fn send_packet<D: Device>(
    router: &mut Router<D>,
    interface: InterfaceId,
    arp_repr: &Arp,
    dst_addr: EthernetAddress,
) -> Result<()> {
    let mut result = Ok(());

    ethernet::send_frame(
        router,
        interface,
        dst_addr,
        eth_types::ARP,
        arp_repr.buffer_len(),
        |arp_buffer| result = arp_repr.serialize(arp_buffer),
    )?;

    result
}

/// Broadcasts an ARP request for an IPv4 address via an interface.
///
/// The reply is processed by recv_packet(...) and updates the ARP cache.
/// Requests are never retried.
pub fn send_request<D: Device>(
    router: &mut Router<D>,
    interface: InterfaceId,
    ipv4_addr: Ipv4Address,
) -> Result<()> {
    let arp_repr = Arp {
        op: ArpOp::Request,
        source_hw_addr: router.interfaces[interface].ethernet_addr,
        source_proto_addr: *router.interfaces[interface].ipv4_addr,
        target_hw_addr: EthernetAddress::default(),
        target_proto_addr: ipv4_addr,
    };

    debug!(
        "Sending ARP request for {} via {}.",
        ipv4_addr, router.interfaces[interface].name
    );
    send_packet(router, interface, &arp_repr, EthernetAddress::BROADCAST)
}

/// Tries to retrieve the Ethernet address and interface for an IPv4 address.
///
/// The IP address may not have an Ethernet mapping yet, in which case an ARP
/// request is sent via the interface and Error::MacResolution returned. The
/// packet which needed the mapping should be dropped.
pub fn eth_addr_for_ip<D: Device>(
    router: &mut Router<D>,
    interface: InterfaceId,
    ipv4_addr: Ipv4Address,
) -> Result<(EthernetAddress, InterfaceId)> {
    match router.arp_cache.eth_addr_for_ip(ipv4_addr) {
        Some(mapping) => Ok(mapping),
        None => {
            debug!("No ARP record for {}.", ipv4_addr);
            send_request(router, interface, ipv4_addr)?;
            Err(Error::MacResolution(ipv4_addr))
        }
    }
}

/// Receives an ARP packet from an interface.
///
/// Packets targeting the interface address update the ARP cache, and requests
/// are answered with a reply.
pub fn recv_packet<D: Device>(
    router: &mut Router<D>,
    interface: InterfaceId,
    arp_buffer: &[u8],
) -> Result<()> {
    let arp_repr = Arp::deserialize(arp_buffer)?;

    let (ethernet_addr, ipv4_addr) = {
        let interface = &router.interfaces[interface];
        if !interface.is_addressed() {
            return Err(Error::Unaddressed);
        }
        (interface.ethernet_addr, *interface.ipv4_addr)
    };

    if arp_repr.target_proto_addr != ipv4_addr {
        debug!(
            "Ignoring ARP with target IPv4 address {}.",
            arp_repr.target_proto_addr
        );
        return Err(Error::Ignored);
    }

    debug!(
        "Received ARP, adding mapping from {} to {}.",
        arp_repr.source_proto_addr, arp_repr.source_hw_addr
    );
    router.arp_cache.set_eth_addr_for_ip(
        arp_repr.source_proto_addr,
        arp_repr.source_hw_addr,
        interface,
    );

    match arp_repr.op {
        ArpOp::Request => {
            let arp_reply = Arp {
                op: ArpOp::Reply,
                source_hw_addr: ethernet_addr,
                source_proto_addr: ipv4_addr,
                target_hw_addr: arp_repr.source_hw_addr,
                target_proto_addr: arp_repr.source_proto_addr,
            };

            debug!(
                "Sending ARP reply to {}/{}.",
                arp_reply.target_proto_addr, arp_reply.target_hw_addr
            );

            send_packet(router, interface, &arp_reply, arp_reply.target_hw_addr)
        }
        ArpOp::Reply => Ok(()),
    }
}
