use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};
use std::io::Write;
use std::result::Result as StdResult;
use std::str::FromStr;

use byteorder::{
    NetworkEndian,
    ReadBytesExt,
    WriteBytesExt,
};

use crate::{
    Error,
    Result,
};

/// [MAC address](https://en.wikipedia.org/wiki/MAC_address) in network byte order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Address([u8; 6]);

impl Address {
    pub const BROADCAST: Address = Address([0xFF; 6]);

    /// Creates a MAC address from a network byte order buffer.
    pub fn new(addr: [u8; 6]) -> Address {
        Address(addr)
    }

    /// Tries to create a MAC address from a network byte order slice.
    pub fn try_new(addr: &[u8]) -> Result<Address> {
        if addr.len() != 6 {
            return Err(Error::TooShort);
        }

        let mut _addr: [u8; 6] = [0; 6];
        _addr.clone_from_slice(addr);
        Ok(Address(_addr))
    }

    /// Returns a reference to the network byte order representation of the
    /// address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Checks if this is a broadcast address.
    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xFF; 6]
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5],
        )
    }
}

impl FromStr for Address {
    type Err = ();

    /// Parses a MAC address from an A:B:C:D:E:F style string.
    fn from_str(addr: &str) -> StdResult<Address, Self::Err> {
        let bytes = addr
            .split(':')
            .map(|token| u8::from_str_radix(token, 16))
            .collect::<StdResult<Vec<_>, _>>()
            .map_err(|_| ())?;

        if bytes.len() != 6 {
            return Err(());
        }

        let mut mac: [u8; 6] = [0; 6];
        mac.clone_from_slice(&bytes);

        Ok(Address::new(mac))
    }
}

/// [https://en.wikipedia.org/wiki/EtherType](https://en.wikipedia.org/wiki/EtherType)
pub mod eth_types {
    pub const IPV4: u16 = 0x800;

    pub const ARP: u16 = 0x806;

    pub const IPV6: u16 = 0x86DD;
}

mod fields {
    use std::ops::{
        Range,
        RangeFrom,
    };

    pub const DST_ADDR: Range<usize> = 0 .. 6;

    pub const SRC_ADDR: Range<usize> = 6 .. 12;

    pub const PAYLOAD_TYPE: Range<usize> = 12 .. 14;

    pub const PAYLOAD: RangeFrom<usize> = 14 ..;
}

/// View of a byte buffer as an Ethernet frame.
#[derive(Debug)]
pub struct Frame<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> AsRef<[u8]> for Frame<T> {
    fn as_ref(&self) -> &[u8] {
        self.buffer.as_ref()
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> AsMut<[u8]> for Frame<T> {
    fn as_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut()
    }
}

impl<T: AsRef<[u8]>> Frame<T> {
    pub const HEADER_LEN: usize = 14;

    /// Tries to create an Ethernet frame view over a byte buffer.
    pub fn try_new(buffer: T) -> Result<Frame<T>> {
        if buffer.as_ref().len() < Self::HEADER_LEN {
            Err(Error::TooShort)
        } else {
            Ok(Frame { buffer })
        }
    }

    /// Returns the length of an Ethernet frame with the specified payload size.
    pub fn buffer_len(payload_len: usize) -> usize {
        Self::HEADER_LEN + payload_len
    }

    pub fn dst_addr(&self) -> Address {
        Address::try_new(&self.buffer.as_ref()[fields::DST_ADDR]).unwrap()
    }

    pub fn src_addr(&self) -> Address {
        Address::try_new(&self.buffer.as_ref()[fields::SRC_ADDR]).unwrap()
    }

    pub fn payload_type(&self) -> u16 {
        (&self.buffer.as_ref()[fields::PAYLOAD_TYPE])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[fields::PAYLOAD]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Frame<T> {
    pub fn set_dst_addr(&mut self, addr: Address) {
        (&mut self.buffer.as_mut()[fields::DST_ADDR])
            .write_all(addr.as_bytes())
            .unwrap();
    }

    pub fn set_src_addr(&mut self, addr: Address) {
        (&mut self.buffer.as_mut()[fields::SRC_ADDR])
            .write_all(addr.as_bytes())
            .unwrap();
    }

    pub fn set_payload_type(&mut self, payload_type: u16) {
        (&mut self.buffer.as_mut()[fields::PAYLOAD_TYPE])
            .write_u16::<NetworkEndian>(payload_type)
            .unwrap();
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[fields::PAYLOAD]
    }
}

/// Decoded Ethernet header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Repr {
    pub dst_addr: Address,
    pub src_addr: Address,
    pub payload_type: u16,
}

impl Repr {
    /// Reads the header fields out of a frame.
    pub fn deserialize<T>(frame: &Frame<T>) -> Repr
    where
        T: AsRef<[u8]>,
    {
        Repr {
            dst_addr: frame.dst_addr(),
            src_addr: frame.src_addr(),
            payload_type: frame.payload_type(),
        }
    }

    /// Writes the header fields into a frame.
    pub fn serialize<T>(&self, frame: &mut Frame<T>)
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        frame.set_dst_addr(self.dst_addr);
        frame.set_src_addr(self.src_addr);
        frame.set_payload_type(self.payload_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_too_short() {
        let buffer: [u8; 13] = [0; 13];
        assert_matches!(Frame::try_new(&buffer[..]), Err(Error::TooShort));
    }

    #[test]
    fn test_frame_getters() {
        let buffer: [u8; 15] = [
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02, 0x00, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06,
            0xAB,
        ];
        let frame = Frame::try_new(&buffer[..]).unwrap();
        let repr = Repr::deserialize(&frame);
        assert!(repr.dst_addr.is_broadcast());
        assert_eq!(repr.src_addr, Address::new([0x02, 0, 0, 0, 0, 0x01]));
        assert_eq!(repr.payload_type, eth_types::ARP);
        assert_eq!(frame.payload(), [0xAB]);
    }

    #[test]
    fn test_frame_setters() {
        let mut buffer: [u8; 14] = [0; 14];

        {
            let mut frame = Frame::try_new(&mut buffer[..]).unwrap();
            let repr = Repr {
                dst_addr: Address::new([1, 2, 3, 4, 5, 6]),
                src_addr: Address::new([7, 8, 9, 10, 11, 12]),
                payload_type: eth_types::IPV4,
            };
            repr.serialize(&mut frame);
        }

        assert_eq!(
            &buffer[..],
            &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 0x08, 0x00][..]
        );
    }

    #[test]
    fn test_address_from_str() {
        assert_eq!(
            "06:11:22:33:44:55".parse::<Address>(),
            Ok(Address::new([0x06, 0x11, 0x22, 0x33, 0x44, 0x55]))
        );
        assert_eq!("06:11:22".parse::<Address>(), Err(()));
        assert_eq!("06:11:22:33:44:ZZ".parse::<Address>(), Err(()));
    }
}
