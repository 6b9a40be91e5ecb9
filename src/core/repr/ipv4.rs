use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};
use std::io::Write;
use std::ops::Deref;
use std::result::Result as StdResult;
use std::str::FromStr;

use byteorder::{
    NetworkEndian,
    ReadBytesExt,
    WriteBytesExt,
};

use crate::core::check::internet_checksum;
use crate::{
    Error,
    Result,
};

/// [IPv4 address](https://en.wikipedia.org/wiki/IPv4) in network byte order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Address([u8; 4]);

impl Address {
    /// The limited broadcast address, 255.255.255.255.
    pub const BROADCAST: Address = Address([0xFF; 4]);

    /// The unspecified address, 0.0.0.0.
    pub const UNSPECIFIED: Address = Address([0; 4]);

    /// Creates an IPv4 address from a network byte order buffer.
    pub fn new(addr: [u8; 4]) -> Address {
        Address(addr)
    }

    /// Tries to create an IPv4 address from a network byte order slice.
    pub fn try_new(addr: &[u8]) -> Result<Address> {
        if addr.len() != 4 {
            return Err(Error::TooShort);
        }

        let mut _addr: [u8; 4] = [0; 4];
        _addr.clone_from_slice(addr);
        Ok(Address(_addr))
    }

    /// Creates an IPv4 address from its host order integer value.
    pub fn from_u32(addr: u32) -> Address {
        let mut _addr: [u8; 4] = [0; 4];
        (&mut _addr[..]).write_u32::<NetworkEndian>(addr).unwrap();
        Address(_addr)
    }

    /// Returns the address as a host order integer.
    pub fn as_u32(&self) -> u32 {
        (&self.0[..]).read_u32::<NetworkEndian>().unwrap()
    }

    /// Returns a reference to the network byte order representation of the address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Checks if this is the unspecified (all zero) address.
    pub fn is_unspecified(&self) -> bool {
        self.0 == [0; 4]
    }

    /// Checks if this is the limited broadcast address.
    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xFF; 4]
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl FromStr for Address {
    type Err = ();

    /// Parses an Ipv4 address from an A.B.C.D style string.
    fn from_str(addr: &str) -> StdResult<Address, Self::Err> {
        let bytes = addr
            .split('.')
            .map(|token| token.parse::<u8>())
            .collect::<StdResult<Vec<_>, _>>()
            .map_err(|_| ())?;

        if bytes.len() != 4 {
            return Err(());
        }

        let mut ipv4: [u8; 4] = [0; 4];
        ipv4.clone_from_slice(&bytes);

        Ok(Address::new(ipv4))
    }
}

/// An IPv4 address with a subnet mask, i.e. an address assigned to an
/// interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddressCidr {
    addr: Address,
    subnet_mask: Address,
}

impl AddressCidr {
    /// Creates an address with a subnet of prefix_len leading one bits.
    ///
    /// # Panics
    ///
    /// Causes a panic if prefix_len is larger than 32.
    pub fn new(addr: Address, prefix_len: u32) -> AddressCidr {
        assert!(prefix_len <= 32);

        let subnet_mask = match prefix_len {
            0 => 0,
            n => !0u32 << (32 - n),
        };

        AddressCidr {
            addr,
            subnet_mask: Address::from_u32(subnet_mask),
        }
    }

    /// Creates an address from a dotted subnet mask such as 255.255.255.0.
    pub fn with_mask(addr: Address, subnet_mask: Address) -> AddressCidr {
        AddressCidr { addr, subnet_mask }
    }

    /// Returns the subnet mask.
    pub fn subnet_mask(&self) -> Address {
        self.subnet_mask
    }

    /// Returns the number of leading one bits in the subnet mask.
    pub fn prefix_len(&self) -> u32 {
        (!self.subnet_mask.as_u32()).leading_zeros()
    }

    /// Returns the network address, i.e. the address with host bits cleared.
    pub fn network(&self) -> Address {
        Address::from_u32(self.addr.as_u32() & self.subnet_mask.as_u32())
    }

    /// Returns the directed broadcast address of the subnet.
    pub fn broadcast(&self) -> Address {
        Address::from_u32(self.addr.as_u32() | !self.subnet_mask.as_u32())
    }

    /// Checks if an address is part of the subnet.
    pub fn is_member(&self, addr: Address) -> bool {
        let mask = self.subnet_mask.as_u32();
        (addr.as_u32() & mask) == (self.addr.as_u32() & mask)
    }
}

impl Deref for AddressCidr {
    type Target = Address;

    fn deref(&self) -> &Address {
        &self.addr
    }
}

impl Display for AddressCidr {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}/{}", self.addr, self.prefix_len())
    }
}

impl FromStr for AddressCidr {
    type Err = ();

    /// Parses an address with a prefix from an A.B.C.D/N style string.
    fn from_str(addr: &str) -> StdResult<AddressCidr, Self::Err> {
        let mut tokens = addr.splitn(2, '/');
        let addr = tokens.next().ok_or(())?.parse::<Address>()?;
        let prefix_len = tokens
            .next()
            .ok_or(())?
            .parse::<u32>()
            .map_err(|_| ())?;

        if prefix_len > 32 {
            return Err(());
        }

        Ok(AddressCidr::new(addr, prefix_len))
    }
}

/// [https://en.wikipedia.org/wiki/List_of_IP_protocol_numbers](https://en.wikipedia.org/wiki/List_of_IP_protocol_numbers)
pub mod protocols {
    pub const ICMP: u8 = 0x01;

    pub const TCP: u8 = 0x06;

    pub const UDP: u8 = 0x11;
}

/// [https://en.wikipedia.org/wiki/IPv4#Flags](https://en.wikipedia.org/wiki/IPv4#Flags)
pub mod flags {
    pub const DONT_FRAGMENT: u16 = 0x4000;
}

mod fields {
    use std::ops::{
        Range,
        RangeFrom,
    };

    pub const VERSION_AND_HEADER_LEN: usize = 0;

    pub const TOS: usize = 1;

    pub const TOTAL_LEN: Range<usize> = 2 .. 4;

    pub const IDENTIFICATION: Range<usize> = 4 .. 6;

    pub const FLAGS_AND_FRAGMENT_OFFSET: Range<usize> = 6 .. 8;

    pub const TTL: usize = 8;

    pub const PROTOCOL: usize = 9;

    pub const CHECKSUM: Range<usize> = 10 .. 12;

    pub const SRC_ADDR: Range<usize> = 12 .. 16;

    pub const DST_ADDR: Range<usize> = 16 .. 20;

    pub const PAYLOAD: RangeFrom<usize> = 20 ..;
}

/// View of a byte buffer as an IPv4 packet without options.
#[derive(Debug)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> AsRef<[u8]> for Packet<T> {
    fn as_ref(&self) -> &[u8] {
        self.buffer.as_ref()
    }
}

impl<T: AsRef<[u8]>> Packet<T> {
    pub const HEADER_LEN: usize = 20;

    /// Tries to create an IPv4 packet view over a byte buffer.
    ///
    /// Only the buffer length is checked. Callers are responsible for
    /// rejecting unsupported versions, options, etc.
    pub fn try_new(buffer: T) -> Result<Packet<T>> {
        if buffer.as_ref().len() < Self::HEADER_LEN {
            Err(Error::TooShort)
        } else {
            Ok(Packet { buffer })
        }
    }

    /// Returns the length of an IPv4 packet with no options and the payload size.
    pub fn buffer_len(payload_len: usize) -> usize {
        Self::HEADER_LEN + payload_len
    }

    /// Calculates the checksum over the 20 byte header.
    pub fn gen_header_checksum(&self) -> u16 {
        internet_checksum(&self.buffer.as_ref()[.. Self::HEADER_LEN])
    }

    pub fn ip_version(&self) -> u8 {
        self.buffer.as_ref()[fields::VERSION_AND_HEADER_LEN] >> 4
    }

    /// Returns the header length in 32 bit words.
    pub fn header_len(&self) -> u8 {
        self.buffer.as_ref()[fields::VERSION_AND_HEADER_LEN] & 0x0F
    }

    pub fn tos(&self) -> u8 {
        self.buffer.as_ref()[fields::TOS]
    }

    pub fn total_len(&self) -> u16 {
        (&self.buffer.as_ref()[fields::TOTAL_LEN])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    pub fn identification(&self) -> u16 {
        (&self.buffer.as_ref()[fields::IDENTIFICATION])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    /// Returns the flags and fragment offset as a single 16 bit field.
    pub fn flags_and_fragment_offset(&self) -> u16 {
        (&self.buffer.as_ref()[fields::FLAGS_AND_FRAGMENT_OFFSET])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    pub fn ttl(&self) -> u8 {
        self.buffer.as_ref()[fields::TTL]
    }

    pub fn protocol(&self) -> u8 {
        self.buffer.as_ref()[fields::PROTOCOL]
    }

    pub fn header_checksum(&self) -> u16 {
        (&self.buffer.as_ref()[fields::CHECKSUM])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    pub fn src_addr(&self) -> Address {
        Address::try_new(&self.buffer.as_ref()[fields::SRC_ADDR]).unwrap()
    }

    pub fn dst_addr(&self) -> Address {
        Address::try_new(&self.buffer.as_ref()[fields::DST_ADDR]).unwrap()
    }

    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[fields::PAYLOAD]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    pub fn set_version_and_header_len(&mut self, version: u8, header_len: u8) {
        self.buffer.as_mut()[fields::VERSION_AND_HEADER_LEN] = (version << 4) | (header_len & 0x0F);
    }

    pub fn set_tos(&mut self, tos: u8) {
        self.buffer.as_mut()[fields::TOS] = tos;
    }

    pub fn set_total_len(&mut self, total_len: u16) {
        (&mut self.buffer.as_mut()[fields::TOTAL_LEN])
            .write_u16::<NetworkEndian>(total_len)
            .unwrap();
    }

    pub fn set_identification(&mut self, identification: u16) {
        (&mut self.buffer.as_mut()[fields::IDENTIFICATION])
            .write_u16::<NetworkEndian>(identification)
            .unwrap();
    }

    pub fn set_flags_and_fragment_offset(&mut self, flags_and_fragment_offset: u16) {
        (&mut self.buffer.as_mut()[fields::FLAGS_AND_FRAGMENT_OFFSET])
            .write_u16::<NetworkEndian>(flags_and_fragment_offset)
            .unwrap();
    }

    pub fn set_ttl(&mut self, ttl: u8) {
        self.buffer.as_mut()[fields::TTL] = ttl;
    }

    pub fn set_protocol(&mut self, protocol: u8) {
        self.buffer.as_mut()[fields::PROTOCOL] = protocol;
    }

    pub fn set_header_checksum(&mut self, checksum: u16) {
        (&mut self.buffer.as_mut()[fields::CHECKSUM])
            .write_u16::<NetworkEndian>(checksum)
            .unwrap();
    }

    pub fn set_src_addr(&mut self, addr: Address) {
        (&mut self.buffer.as_mut()[fields::SRC_ADDR])
            .write_all(addr.as_bytes())
            .unwrap();
    }

    pub fn set_dst_addr(&mut self, addr: Address) {
        (&mut self.buffer.as_mut()[fields::DST_ADDR])
            .write_all(addr.as_bytes())
            .unwrap();
    }

    /// Zeroes the checksum field, then computes and writes the header checksum.
    pub fn fill_checksum(&mut self) {
        self.set_header_checksum(0);
        let checksum = self.gen_header_checksum();
        self.set_header_checksum(checksum);
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[fields::PAYLOAD]
    }
}

/// Decoded IPv4 header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Repr {
    pub version: u8,
    /// Header length in 32 bit words.
    pub header_len: u8,
    pub tos: u8,
    pub total_len: u16,
    pub identification: u16,
    pub flags_and_fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub src_addr: Address,
    pub dst_addr: Address,
}

impl Repr {
    /// Reads every header field out of a packet. No validation is performed.
    pub fn deserialize<T>(packet: &Packet<T>) -> Repr
    where
        T: AsRef<[u8]>,
    {
        Repr {
            version: packet.ip_version(),
            header_len: packet.header_len(),
            tos: packet.tos(),
            total_len: packet.total_len(),
            identification: packet.identification(),
            flags_and_fragment_offset: packet.flags_and_fragment_offset(),
            ttl: packet.ttl(),
            protocol: packet.protocol(),
            checksum: packet.header_checksum(),
            src_addr: packet.src_addr(),
            dst_addr: packet.dst_addr(),
        }
    }

    /// Serializes the 20 byte header into a packet.
    ///
    /// With fill_checksum the checksum field is computed over the header,
    /// otherwise self.checksum is written as is.
    pub fn serialize<T>(&self, packet: &mut Packet<T>, fill_checksum: bool)
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        packet.set_version_and_header_len(self.version, self.header_len);
        packet.set_tos(self.tos);
        packet.set_total_len(self.total_len);
        packet.set_identification(self.identification);
        packet.set_flags_and_fragment_offset(self.flags_and_fragment_offset);
        packet.set_ttl(self.ttl);
        packet.set_protocol(self.protocol);
        packet.set_src_addr(self.src_addr);
        packet.set_dst_addr(self.dst_addr);

        if fill_checksum {
            packet.fill_checksum();
        } else {
            packet.set_header_checksum(self.checksum);
        }
    }
}
