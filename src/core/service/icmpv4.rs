use crate::core::dev::Device;
use crate::core::repr::{
    ipv4_protocols,
    Icmpv4Message,
    Ipv4Repr,
};
use crate::core::service::{
    ipv4,
    Router,
};
use crate::core::InterfaceId;
use crate::{
    Error,
    Result,
};

/// Receives an ICMP packet addressed to the router.
///
/// Echo requests are answered via the receiving interface with the addresses
/// swapped, everything else is only logged.
pub fn recv_packet<D: Device>(
    router: &mut Router<D>,
    interface: InterfaceId,
    ipv4_repr: &Ipv4Repr,
    icmp_buffer: &[u8],
) -> Result<()> {
    match Icmpv4Message::deserialize(icmp_buffer)? {
        Icmpv4Message::EchoRequest(echo) => {
            debug!(
                "Got a ping from {}; Sending response...",
                ipv4_repr.src_addr
            );
            ipv4::send_encapsulated(
                router,
                interface,
                ipv4_repr.dst_addr,
                ipv4_repr.src_addr,
                ipv4_protocols::ICMP,
                &echo.reply_buffer(),
            )
        }
        Icmpv4Message::EchoReply(echo) => {
            debug!(
                "Echo reply from {} with id {} and seq {}.",
                ipv4_repr.src_addr, echo.id, echo.seq
            );
            Ok(())
        }
        Icmpv4Message::DestinationUnreachable { code, .. } => {
            debug!(
                "Destination unreachable ({}) from {}.",
                code, ipv4_repr.src_addr
            );
            Ok(())
        }
        Icmpv4Message::TimeExceeded { code, .. } => {
            debug!("Time exceeded ({}) from {}.", code, ipv4_repr.src_addr);
            Ok(())
        }
        Icmpv4Message::Other { type_of, code } => {
            debug!("Ignoring ICMP message with type {} code {}.", type_of, code);
            Err(Error::Ignored)
        }
    }
}
