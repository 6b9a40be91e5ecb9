#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate lazy_static;
extern crate usrouter;

mod context;

use usrouter::core::repr::{
    eth_types,
    ipv4_protocols,
    Arp,
    ArpOp,
    EthernetAddress,
    Ipv4Address,
};
use usrouter::core::service::ethernet;
use usrouter::Error;

use crate::context::*;

fn request_from_host(target: Ipv4Address) -> Vec<u8> {
    let arp = Arp {
        op: ArpOp::Request,
        source_hw_addr: *HOST_MAC,
        source_proto_addr: *HOST_IPV4,
        target_hw_addr: EthernetAddress::default(),
        target_proto_addr: target,
    };
    arp_frame(EthernetAddress::BROADCAST, &arp)
}

#[test]
fn arp_request_answered() {
    let mut router = router();

    assert_matches!(
        ethernet::recv_frame(&mut router, ETH0, &request_from_host(*ETH0_IPV4)),
        Ok(())
    );

    let frames = sent(&mut router, ETH0);
    assert_eq!(frames.len(), 1);

    let (eth_repr, arp) = parse_arp(&frames[0]);
    assert_eq!(eth_repr.dst_addr, *HOST_MAC);
    assert_eq!(eth_repr.src_addr, *ETH0_MAC);
    assert_eq!(
        arp,
        Arp {
            op: ArpOp::Reply,
            source_hw_addr: *ETH0_MAC,
            source_proto_addr: *ETH0_IPV4,
            target_hw_addr: *HOST_MAC,
            target_proto_addr: *HOST_IPV4,
        }
    );

    assert_eq!(
        router.arp_cache.eth_addr_for_ip(*HOST_IPV4),
        Some((*HOST_MAC, ETH0))
    );
}

#[test]
fn arp_request_for_other_addr_ignored() {
    let mut router = router();

    // eth1's address is not answered on eth0.
    for target in &[*ETH1_IPV4, Ipv4Address::new([192, 168, 1, 77])] {
        assert_matches!(
            ethernet::recv_frame(&mut router, ETH0, &request_from_host(*target)),
            Err(Error::Ignored)
        );
    }

    assert!(sent(&mut router, ETH0).is_empty());
    assert!(router.arp_cache.is_empty());
}

#[test]
fn arp_on_unaddressed_interface() {
    let mut router = router();

    assert_matches!(
        ethernet::recv_frame(&mut router, ETH2, &request_from_host(*ETH0_IPV4)),
        Err(Error::Unaddressed)
    );
    assert!(sent(&mut router, ETH2).is_empty());
}

#[test]
fn arp_malformed() {
    let mut router = router();
    let frame = eth_frame(EthernetAddress::BROADCAST, *HOST_MAC, eth_types::ARP, &[0; 27]);

    assert_matches!(
        ethernet::recv_frame(&mut router, ETH0, &frame),
        Err(Error::TooShort)
    );
}

#[test]
fn arp_reply_resolves_next_hop() {
    let mut router = router();
    let remote = Ipv4Address::new([192, 168, 2, 9]);
    let ipv4 = ipv4_packet(*HOST_IPV4, remote, ipv4_protocols::UDP, 64, &[1, 2, 3]);
    let frame = eth_frame(*ETH0_MAC, *HOST_MAC, eth_types::IPV4, &ipv4);

    // The first packet is dropped while the next hop is resolved.
    assert_matches!(
        ethernet::recv_frame(&mut router, ETH0, &frame),
        Err(Error::MacResolution(_))
    );
    let frames = sent(&mut router, ETH1);
    assert_eq!(frames.len(), 1);
    assert_arp_request(&frames[0], *ETH1_MAC, *ETH1_IPV4, *NEXT_HOP_IPV4);

    let reply = Arp {
        op: ArpOp::Reply,
        source_hw_addr: *NEXT_HOP_MAC,
        source_proto_addr: *NEXT_HOP_IPV4,
        target_hw_addr: *ETH1_MAC,
        target_proto_addr: *ETH1_IPV4,
    };
    assert_matches!(
        ethernet::recv_frame(&mut router, ETH1, &arp_frame(*ETH1_MAC, &reply)),
        Ok(())
    );
    assert!(sent(&mut router, ETH1).is_empty());

    // The retransmission goes through.
    assert_matches!(ethernet::recv_frame(&mut router, ETH0, &frame), Ok(()));
    let frames = sent(&mut router, ETH1);
    assert_eq!(frames.len(), 1);

    let (eth_repr, ipv4_repr, payload) = parse_ipv4(&frames[0]);
    assert_eq!(eth_repr.dst_addr, *NEXT_HOP_MAC);
    assert_eq!(ipv4_repr.dst_addr, remote);
    assert_eq!(ipv4_repr.ttl, 63);
    assert_eq!(payload, vec![1, 2, 3]);
}

#[test]
fn arp_last_writer_wins() {
    let mut router = router();
    let new_mac = EthernetAddress::new([0x06, 0, 0, 0, 0, 0x99]);

    router
        .arp_cache
        .set_eth_addr_for_ip(*HOST_IPV4, *HOST_MAC, ETH0);

    let arp = Arp {
        op: ArpOp::Reply,
        source_hw_addr: new_mac,
        source_proto_addr: *HOST_IPV4,
        target_hw_addr: *ETH0_MAC,
        target_proto_addr: *ETH0_IPV4,
    };
    assert_matches!(
        ethernet::recv_frame(&mut router, ETH0, &arp_frame(*ETH0_MAC, &arp)),
        Ok(())
    );

    assert_eq!(
        router.arp_cache.eth_addr_for_ip(*HOST_IPV4),
        Some((new_mac, ETH0))
    );
}
