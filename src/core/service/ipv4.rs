use crate::core::dev::Device;
use crate::core::repr::{
    eth_types,
    ipv4_flags,
    ipv4_protocols,
    EthernetRepr,
    Ipv4Address,
    Ipv4Packet,
    Ipv4Repr,
};
use crate::core::route_table::Route;
use crate::core::service::{
    arp,
    ethernet,
    icmpv4,
    Router,
};
use crate::core::InterfaceId;
use crate::{
    Error,
    Result,
};

/// TTL of packets originated by the router.
pub const DEFAULT_TTL: u8 = 64;

/// Identification of packets originated by the router.
pub const DEFAULT_IDENTIFICATION: u16 = 0xF80C;

/// Flags and fragment offset of packets originated by the router.
pub const DEFAULT_FLAGS: u16 = ipv4_flags::DONT_FRAGMENT;

/// Sends a complete IPv4 packet towards an address using the routing table.
///
/// Directly connected hosts are resolved via ARP on the interface of the
/// route, other addresses are sent to the next hop of their route.
pub fn send_packet<D: Device>(
    router: &mut Router<D>,
    dst_addr: Ipv4Address,
    ipv4_buffer: &[u8],
) -> Result<()> {
    match router.route_table.lookup(dst_addr) {
        Some(Route::Connected(interface)) => {
            debug!(
                "{} will be routed through {}.",
                dst_addr, router.interfaces[interface].name
            );
            send_packet_to_host(router, interface, dst_addr, ipv4_buffer)
        }
        Some(Route::Network(next_hop)) => {
            debug!("{} will be routed through {}.", dst_addr, next_hop);
            send_packet_to_next_hop(router, next_hop, ipv4_buffer)
        }
        None => {
            debug!("No route to {}.", dst_addr);
            Err(Error::NoRoute(dst_addr))
        }
    }
}

/// Sends an IPv4 packet to a host on a network attached to the interface.
pub fn send_packet_to_host<D: Device>(
    router: &mut Router<D>,
    interface: InterfaceId,
    dst_addr: Ipv4Address,
    ipv4_buffer: &[u8],
) -> Result<()> {
    let (eth_dst_addr, _) = arp::eth_addr_for_ip(router, interface, dst_addr)?;

    ethernet::send_frame(
        router,
        interface,
        eth_dst_addr,
        eth_types::IPV4,
        ipv4_buffer.len(),
        |payload| payload.copy_from_slice(ipv4_buffer),
    )
}

/// Sends an IPv4 packet to a next hop router.
///
/// Without an ARP record for the next hop, an ARP request is sent if the next
/// hop itself is on a directly connected network.
pub fn send_packet_to_next_hop<D: Device>(
    router: &mut Router<D>,
    next_hop: Ipv4Address,
    ipv4_buffer: &[u8],
) -> Result<()> {
    let (eth_dst_addr, interface) = match router.arp_cache.eth_addr_for_ip(next_hop) {
        Some(mapping) => mapping,
        None => {
            debug!("No ARP record for next hop {}.", next_hop);
            return match router.route_table.lookup(next_hop) {
                Some(Route::Connected(interface)) => {
                    arp::send_request(router, interface, next_hop)?;
                    Err(Error::MacResolution(next_hop))
                }
                _ => {
                    debug!("Next hop {} is not reachable.", next_hop);
                    Err(Error::Unreachable(next_hop))
                }
            };
        }
    };

    ethernet::send_frame(
        router,
        interface,
        eth_dst_addr,
        eth_types::IPV4,
        ipv4_buffer.len(),
        |payload| payload.copy_from_slice(ipv4_buffer),
    )
}

/// Wraps a payload in an IPv4 header and sends it via an interface.
///
/// The header uses the router defaults for identification, flags and TTL.
/// The destination must be resolvable on the interface; otherwise an ARP
/// request is sent and the payload dropped.
pub fn send_encapsulated<D: Device>(
    router: &mut Router<D>,
    interface: InterfaceId,
    src_addr: Ipv4Address,
    dst_addr: Ipv4Address,
    protocol: u8,
    payload: &[u8],
) -> Result<()> {
    let ipv4_packet_len = Ipv4Packet::<&[u8]>::buffer_len(payload.len());
    if ipv4_packet_len > u16::max_value() as usize {
        return Err(Error::Exhausted);
    }

    let ipv4_repr = Ipv4Repr {
        version: 4,
        header_len: (Ipv4Packet::<&[u8]>::HEADER_LEN / 4) as u8,
        tos: 0,
        total_len: ipv4_packet_len as u16,
        identification: DEFAULT_IDENTIFICATION,
        flags_and_fragment_offset: DEFAULT_FLAGS,
        ttl: DEFAULT_TTL,
        protocol,
        checksum: 0,
        src_addr,
        dst_addr,
    };

    let (eth_dst_addr, _) = arp::eth_addr_for_ip(router, interface, dst_addr)?;

    ethernet::send_frame(
        router,
        interface,
        eth_dst_addr,
        eth_types::IPV4,
        ipv4_packet_len,
        |ipv4_buffer| {
            let mut ipv4_packet = Ipv4Packet::try_new(ipv4_buffer).unwrap();
            ipv4_repr.serialize(&mut ipv4_packet, true);
            ipv4_packet.payload_mut().copy_from_slice(payload);
        },
    )
}

/// Receives an IPv4 packet from an interface.
///
/// The packet is validated, the sender's Ethernet address is learned, and the
/// packet is either processed locally or forwarded.
pub fn recv_packet<D: Device>(
    router: &mut Router<D>,
    interface: InterfaceId,
    eth_repr: &EthernetRepr,
    ipv4_buffer: &[u8],
) -> Result<()> {
    if !router.interfaces[interface].is_addressed() {
        return Err(Error::Unaddressed);
    }

    let ipv4_packet = Ipv4Packet::try_new(ipv4_buffer)?;
    let ipv4_repr = Ipv4Repr::deserialize(&ipv4_packet);

    if ipv4_repr.version != 4 {
        debug!("Ignoring IP packet with version {}.", ipv4_repr.version);
        return Err(Error::Malformed);
    }

    let header_len = ipv4_repr.header_len as usize * 4;
    if header_len > Ipv4Packet::<&[u8]>::HEADER_LEN {
        debug!("Ignoring IPv4 packet with options.");
        return Err(Error::UnsupportedOption);
    } else if header_len < Ipv4Packet::<&[u8]>::HEADER_LEN {
        return Err(Error::Malformed);
    }

    // Ethernet pads short frames, so trust the total length over the buffer.
    let total_len = ipv4_repr.total_len as usize;
    if total_len < header_len || total_len > ipv4_buffer.len() {
        return Err(Error::Malformed);
    }
    let ipv4_buffer = &ipv4_buffer[.. total_len];

    debug!(
        "Received IPv4 packet with protocol {} from {} to {} via {}.",
        ipv4_repr.protocol,
        ipv4_repr.src_addr,
        ipv4_repr.dst_addr,
        router.interfaces[interface].name
    );

    let src_addr = ipv4_repr.src_addr;
    if !src_addr.is_unspecified()
        && !src_addr.is_broadcast()
        && router.arp_cache.eth_addr_for_ip(src_addr).is_none()
    {
        debug!(
            "Learned mapping from {} to {}.",
            src_addr, eth_repr.src_addr
        );
        router
            .arp_cache
            .set_eth_addr_for_ip(src_addr, eth_repr.src_addr, interface);
    }

    let dst_addr = ipv4_repr.dst_addr;
    if dst_addr.is_broadcast()
        || dst_addr == *router.interfaces[interface].ipv4_addr
        || router.is_router_addr(dst_addr)
    {
        recv_local(router, interface, &ipv4_repr, &ipv4_buffer[header_len ..])
    } else {
        forward_packet(router, ipv4_buffer)
    }
}

/// Dispatches a packet addressed to the router to its upper layer protocol.
fn recv_local<D: Device>(
    router: &mut Router<D>,
    interface: InterfaceId,
    ipv4_repr: &Ipv4Repr,
    payload: &[u8],
) -> Result<()> {
    match ipv4_repr.protocol {
        ipv4_protocols::ICMP => icmpv4::recv_packet(router, interface, ipv4_repr, payload),
        ipv4_protocols::TCP | ipv4_protocols::UDP => {
            router.transport.recv(interface, ipv4_repr, payload);
            Ok(())
        }
        i => {
            debug!("Ignoring IPv4 packet with protocol {}.", i);
            Err(Error::Ignored)
        }
    }
}

/// Forwards a packet which is not addressed to the router.
///
/// The TTL is decremented and the header checksum updated on a copy of the
/// packet before it is sent on.
fn forward_packet<D: Device>(router: &mut Router<D>, ipv4_buffer: &[u8]) -> Result<()> {
    let mut forward_buffer = ipv4_buffer.to_vec();

    let dst_addr = {
        let mut ipv4_packet = Ipv4Packet::try_new(&mut forward_buffer[..])?;
        let ttl = ipv4_packet.ttl();
        if ttl <= 1 {
            debug!(
                "Dropping packet to {} with expired TTL.",
                ipv4_packet.dst_addr()
            );
            return Err(Error::TtlExpired);
        }
        ipv4_packet.set_ttl(ttl - 1);
        ipv4_packet.fill_checksum();
        ipv4_packet.dst_addr()
    };

    send_packet(router, dst_addr, &forward_buffer)
}
