use crate::core::dev::Device;
use crate::core::repr::{
    eth_types,
    EthernetAddress,
    EthernetFrame,
    EthernetRepr,
};
use crate::core::service::{
    arp,
    ipv4,
    Router,
};
use crate::core::InterfaceId;
use crate::{
    Error,
    Result,
};

/// Sends an Ethernet frame via an interface.
///
/// The source address is set to the interface address and f is expected to
/// fill in the payload_len bytes of payload.
pub fn send_frame<D, F>(
    router: &mut Router<D>,
    interface: InterfaceId,
    dst_addr: EthernetAddress,
    payload_type: u16,
    payload_len: usize,
    f: F,
) -> Result<()>
where
    D: Device,
    F: FnOnce(&mut [u8]),
{
    let interface = &mut router.interfaces[interface];

    let mut eth_buffer = vec![0; EthernetFrame::<&[u8]>::buffer_len(payload_len)];
    let mut eth_frame = EthernetFrame::try_new(&mut eth_buffer[..])?;
    let eth_repr = EthernetRepr {
        dst_addr,
        src_addr: interface.ethernet_addr,
        payload_type,
    };
    eth_repr.serialize(&mut eth_frame);
    f(eth_frame.payload_mut());

    interface.dev.send(eth_frame.as_ref())
}

/// Receives an Ethernet frame from an interface.
///
/// The Ethernet frame is parsed, filtered by destination address and
/// propagated up the network stack.
pub fn recv_frame<D: Device>(
    router: &mut Router<D>,
    interface: InterfaceId,
    eth_buffer: &[u8],
) -> Result<()> {
    let eth_frame = EthernetFrame::try_new(eth_buffer)?;
    let eth_repr = EthernetRepr::deserialize(&eth_frame);

    if eth_repr.dst_addr != router.interfaces[interface].ethernet_addr
        && !eth_repr.dst_addr.is_broadcast()
    {
        debug!(
            "Ignoring ethernet frame with destination {}.",
            eth_repr.dst_addr
        );
        return Err(Error::Ignored);
    }

    match eth_repr.payload_type {
        eth_types::ARP => arp::recv_packet(router, interface, eth_frame.payload()),
        eth_types::IPV4 => ipv4::recv_packet(router, interface, &eth_repr, eth_frame.payload()),
        eth_types::IPV6 => {
            debug!("Ignoring IPv6 frame from {}.", eth_repr.src_addr);
            Err(Error::Ignored)
        }
        i => {
            debug!("Ignoring ethernet frame with type 0x{:04X}.", i);
            Err(Error::Ignored)
        }
    }
}

/// Reads and processes all pending frames from an interface.
///
/// Dropped packets are logged and do not stop processing. Only a failure to
/// read from the device itself is returned.
pub fn recv<D: Device>(router: &mut Router<D>, interface: InterfaceId) -> Result<()> {
    let mut eth_buffer = vec![0; router.interfaces[interface].dev.max_transmission_unit()];

    loop {
        let buffer_len = match router.interfaces[interface].dev.recv(&mut eth_buffer) {
            Ok(buffer_len) => buffer_len,
            Err(Error::Exhausted) => return Ok(()),
            Err(err) => return Err(err),
        };

        match recv_frame(router, interface, &eth_buffer[.. buffer_len]) {
            Ok(_) | Err(Error::Ignored) => {}
            Err(Error::Io(err)) => warn!(
                "Error sending via {} with {:?}.",
                router.interfaces[interface].name, err
            ),
            Err(err) => debug!(
                "Dropped frame from {} with {:?}.",
                router.interfaces[interface].name, err
            ),
        }
    }
}

/// Processes the pending frames of each interface in turn.
///
/// A device failing to read is logged and skipped, so the remaining
/// interfaces are still serviced.
pub fn recv_all<D: Device>(router: &mut Router<D>, interfaces: &[InterfaceId]) {
    for interface in interfaces {
        if let Err(err) = recv(router, *interface) {
            warn!(
                "Error receiving via {} with {:?}.",
                router.interfaces[*interface].name, err
            );
        }
    }
}
