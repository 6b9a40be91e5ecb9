#![allow(dead_code)]

use usrouter::core::dev::MockDevice;
use usrouter::core::repr::{
    eth_types,
    ipv4_protocols,
    Arp,
    ArpOp,
    EthernetAddress,
    EthernetFrame,
    EthernetRepr,
    Icmpv4Echo,
    Ipv4Address,
    Ipv4AddressCidr,
    Ipv4Packet,
    Ipv4Repr,
};
use usrouter::core::route_table::StaticRoute;
use usrouter::core::service::{
    Interface,
    Router,
};
use usrouter::core::InterfaceId;

/// 192.168.1.1/24
pub const ETH0: InterfaceId = 0;

/// 192.168.0.1/24
pub const ETH1: InterfaceId = 1;

/// No IPv4 address.
pub const ETH2: InterfaceId = 2;

lazy_static! {
    pub static ref ETH0_MAC: EthernetAddress = EthernetAddress::new([0x02, 0, 0, 0, 0, 0x01]);

    pub static ref ETH1_MAC: EthernetAddress = EthernetAddress::new([0x02, 0, 0, 0, 0, 0x02]);

    pub static ref ETH2_MAC: EthernetAddress = EthernetAddress::new([0x02, 0, 0, 0, 0, 0x03]);

    pub static ref ETH0_IPV4: Ipv4Address = Ipv4Address::new([192, 168, 1, 1]);

    pub static ref ETH1_IPV4: Ipv4Address = Ipv4Address::new([192, 168, 0, 1]);

    /// A host on the network attached to eth0.
    pub static ref HOST_MAC: EthernetAddress = {
        EthernetAddress::new([0x06, 0x11, 0x22, 0x33, 0x44, 0x55])
    };

    pub static ref HOST_IPV4: Ipv4Address = Ipv4Address::new([192, 168, 1, 2]);

    /// The next hop towards 192.168.2.0/24, attached to eth1.
    pub static ref NEXT_HOP_MAC: EthernetAddress = {
        EthernetAddress::new([0x06, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE])
    };

    pub static ref NEXT_HOP_IPV4: Ipv4Address = Ipv4Address::new([192, 168, 0, 2]);
}

/// Creates a router with two addressed interfaces, one unaddressed interface
/// and a static route to 192.168.2.0/24 via 192.168.0.2.
pub fn router() -> Router<MockDevice> {
    let interfaces = vec![
        Interface::new(
            "eth0",
            MockDevice::new(),
            *ETH0_MAC,
            Ipv4AddressCidr::new(*ETH0_IPV4, 24),
        ),
        Interface::new(
            "eth1",
            MockDevice::new(),
            *ETH1_MAC,
            Ipv4AddressCidr::new(*ETH1_IPV4, 24),
        ),
        Interface::new(
            "eth2",
            MockDevice::new(),
            *ETH2_MAC,
            Ipv4AddressCidr::new(Ipv4Address::UNSPECIFIED, 0),
        ),
    ];

    let mut router = Router::new(interfaces).unwrap();
    let static_route: StaticRoute = "192.168.2.0/24,192.168.0.2".parse().unwrap();
    router.route_table.add_static(&static_route).unwrap();
    router
}

/// Builds an Ethernet frame around a payload.
pub fn eth_frame(
    dst_addr: EthernetAddress,
    src_addr: EthernetAddress,
    payload_type: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut buffer = vec![0; EthernetFrame::<&[u8]>::buffer_len(payload.len())];
    {
        let mut frame = EthernetFrame::try_new(&mut buffer[..]).unwrap();
        let eth_repr = EthernetRepr {
            dst_addr,
            src_addr,
            payload_type,
        };
        eth_repr.serialize(&mut frame);
        frame.payload_mut().copy_from_slice(payload);
    }
    buffer
}

/// Builds an IPv4 packet with a valid header checksum.
pub fn ipv4_packet(
    src_addr: Ipv4Address,
    dst_addr: Ipv4Address,
    protocol: u8,
    ttl: u8,
    payload: &[u8],
) -> Vec<u8> {
    let packet_len = Ipv4Packet::<&[u8]>::buffer_len(payload.len());
    let mut buffer = vec![0; packet_len];
    {
        let mut packet = Ipv4Packet::try_new(&mut buffer[..]).unwrap();
        let ipv4_repr = Ipv4Repr {
            version: 4,
            header_len: 5,
            tos: 0,
            total_len: packet_len as u16,
            identification: 0x1234,
            flags_and_fragment_offset: 0,
            ttl,
            protocol,
            checksum: 0,
            src_addr,
            dst_addr,
        };
        ipv4_repr.serialize(&mut packet, true);
        packet.payload_mut().copy_from_slice(payload);
    }
    buffer
}

pub fn echo_request(id: u16, seq: u16, data: &[u8]) -> Vec<u8> {
    let echo = Icmpv4Echo {
        id,
        seq,
        timestamp: [1, 2, 3, 4, 5, 6, 7, 8],
        data,
    };
    echo.request_buffer()
}

/// Builds a frame from the host on eth0 pinging an address.
pub fn ping_frame(dst_addr: Ipv4Address, eth_dst_addr: EthernetAddress, data: &[u8]) -> Vec<u8> {
    let ipv4 = ipv4_packet(
        *HOST_IPV4,
        dst_addr,
        ipv4_protocols::ICMP,
        64,
        &echo_request(42, 7, data),
    );
    eth_frame(eth_dst_addr, *HOST_MAC, eth_types::IPV4, &ipv4)
}

pub fn arp_frame(dst_addr: EthernetAddress, arp: &Arp) -> Vec<u8> {
    let mut buffer = vec![0; arp.buffer_len()];
    arp.serialize(&mut buffer).unwrap();
    eth_frame(dst_addr, arp.source_hw_addr, eth_types::ARP, &buffer)
}

/// Removes and returns every frame sent via an interface.
pub fn sent(router: &mut Router<MockDevice>, interface: InterfaceId) -> Vec<Vec<u8>> {
    router.interfaces[interface].dev.tx.drain(..).collect()
}

/// Splits a sent frame into its Ethernet header and payload.
pub fn parse_eth(frame: &[u8]) -> (EthernetRepr, Vec<u8>) {
    let frame = EthernetFrame::try_new(frame).unwrap();
    (EthernetRepr::deserialize(&frame), frame.payload().to_vec())
}

/// Parses a sent frame as an IPv4 packet, checking the header checksum.
pub fn parse_ipv4(frame: &[u8]) -> (EthernetRepr, Ipv4Repr, Vec<u8>) {
    let (eth_repr, payload) = parse_eth(frame);
    assert_eq!(eth_repr.payload_type, eth_types::IPV4);

    let packet = Ipv4Packet::try_new(&payload[..]).unwrap();
    assert_eq!(packet.gen_header_checksum(), 0);
    (
        eth_repr,
        Ipv4Repr::deserialize(&packet),
        packet.payload().to_vec(),
    )
}

/// Parses a sent frame as an ARP packet.
pub fn parse_arp(frame: &[u8]) -> (EthernetRepr, Arp) {
    let (eth_repr, payload) = parse_eth(frame);
    assert_eq!(eth_repr.payload_type, eth_types::ARP);
    (eth_repr, Arp::deserialize(&payload).unwrap())
}

/// Asserts a frame is a broadcast ARP request sent via an interface.
pub fn assert_arp_request(
    frame: &[u8],
    src_mac: EthernetAddress,
    src_ipv4: Ipv4Address,
    target: Ipv4Address,
) {
    let (eth_repr, arp) = parse_arp(frame);
    assert_eq!(eth_repr.dst_addr, EthernetAddress::BROADCAST);
    assert_eq!(eth_repr.src_addr, src_mac);
    assert_eq!(
        arp,
        Arp {
            op: ArpOp::Request,
            source_hw_addr: src_mac,
            source_proto_addr: src_ipv4,
            target_hw_addr: EthernetAddress::default(),
            target_proto_addr: target,
        }
    );
}
