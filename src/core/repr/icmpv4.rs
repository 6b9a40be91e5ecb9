use std::io::Write;

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

/// [https://www.iana.org/assignments/icmp-parameters/icmp-parameters.xhtml#icmp-parameters-types](https://www.iana.org/assignments/icmp-parameters/icmp-parameters.xhtml#icmp-parameters-types)
pub mod types {
    pub const ECHO_REPLY: u8 = 0;

    pub const DESTINATION_UNREACHABLE: u8 = 3;

    pub const ECHO_REQUEST: u8 = 8;

    pub const TIME_EXCEEDED: u8 = 11;
}

/// [https://en.wikipedia.org/wiki/Internet_Control_Message_Protocol](https://en.wikipedia.org/wiki/Internet_Control_Message_Protocol)
mod fields {
    use std::ops::{
        Range,
        RangeFrom,
    };

    pub const TYPE: usize = 0;

    pub const CODE: usize = 1;

    pub const CHECKSUM: Range<usize> = 2 .. 4;

    pub const BODY: RangeFrom<usize> = 4 ..;

    pub const ECHO_ID: Range<usize> = 4 .. 6;

    pub const ECHO_SEQ: Range<usize> = 6 .. 8;

    pub const ECHO_TIMESTAMP: Range<usize> = 8 .. 16;

    pub const ECHO_DATA: RangeFrom<usize> = 16 ..;

    pub const ERROR_DATA: RangeFrom<usize> = 8 ..;
}

/// View of a byte buffer as an ICMP packet.
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
    pub const HEADER_LEN: usize = 4;

    /// Tries to create an ICMP packet view over a byte buffer.
    pub fn try_new(buffer: T) -> Result<Packet<T>> {
        if buffer.as_ref().len() < Self::HEADER_LEN {
            Err(Error::TooShort)
        } else {
            Ok(Packet { buffer })
        }
    }

    /// Checks if the packet checksum is valid.
    pub fn check_encoding(&self) -> Result<()> {
        if self.gen_packet_checksum() != 0 {
            Err(Error::Malformed)
        } else {
            Ok(())
        }
    }

    /// Calculates the packet checksum.
    pub fn gen_packet_checksum(&self) -> u16 {
        internet_checksum(self.buffer.as_ref())
    }

    pub fn _type(&self) -> u8 {
        self.buffer.as_ref()[fields::TYPE]
    }

    pub fn code(&self) -> u8 {
        self.buffer.as_ref()[fields::CODE]
    }

    pub fn checksum(&self) -> u16 {
        (&self.buffer.as_ref()[fields::CHECKSUM])
            .read_u16::<NetworkEndian>()
            .unwrap()
    }

    /// Returns the type dependent part of the message.
    pub fn body(&self) -> &[u8] {
        &self.buffer.as_ref()[fields::BODY]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    pub fn set_type(&mut self, type_of: u8) {
        self.buffer.as_mut()[fields::TYPE] = type_of
    }

    pub fn set_code(&mut self, code: u8) {
        self.buffer.as_mut()[fields::CODE] = code;
    }

    pub fn set_checksum(&mut self, checksum: u16) {
        (&mut self.buffer.as_mut()[fields::CHECKSUM])
            .write_u16::<NetworkEndian>(checksum)
            .unwrap()
    }

    /// Zeroes the checksum field, then computes and writes the checksum over
    /// the whole message.
    pub fn fill_checksum(&mut self) {
        self.set_checksum(0);
        let checksum = self.gen_packet_checksum();
        self.set_checksum(checksum);
    }
}

/// Body of an echo request or reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Echo<'a> {
    pub id: u16,
    pub seq: u16,
    pub timestamp: [u8; 8],
    /// Opaque payload, echoed back verbatim.
    pub data: &'a [u8],
}

impl<'a> Echo<'a> {
    /// Common header, identifier, sequence and timestamp.
    pub const HEADER_LEN: usize = 16;

    /// Returns the size of the serialized echo message.
    pub fn buffer_len(&self) -> usize {
        Self::HEADER_LEN + self.data.len()
    }

    /// Builds the echo reply answering this echo request.
    pub fn reply_buffer(&self) -> Vec<u8> {
        self.to_buffer(types::ECHO_REPLY)
    }

    /// Builds an echo request carrying this echo body.
    pub fn request_buffer(&self) -> Vec<u8> {
        self.to_buffer(types::ECHO_REQUEST)
    }

    fn to_buffer(&self, type_of: u8) -> Vec<u8> {
        let mut buffer = vec![0; self.buffer_len()];

        {
            let mut packet = Packet::try_new(&mut buffer[..]).unwrap();
            packet.set_type(type_of);
            packet.set_code(0);
            packet.set_checksum(0);
        }

        (&mut buffer[fields::ECHO_ID])
            .write_u16::<NetworkEndian>(self.id)
            .unwrap();
        (&mut buffer[fields::ECHO_SEQ])
            .write_u16::<NetworkEndian>(self.seq)
            .unwrap();
        (&mut buffer[fields::ECHO_TIMESTAMP])
            .write_all(&self.timestamp)
            .unwrap();
        (&mut buffer[fields::ECHO_DATA])
            .write_all(self.data)
            .unwrap();

        Packet::try_new(&mut buffer[..]).unwrap().fill_checksum();

        buffer
    }
}

/// Decoded ICMP message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message<'a> {
    EchoReply(Echo<'a>),
    EchoRequest(Echo<'a>),
    /// Leading bytes of the offending packet follow a reserved word.
    DestinationUnreachable { code: u8, data: &'a [u8] },
    TimeExceeded { code: u8, data: &'a [u8] },
    Other { type_of: u8, code: u8 },
}

impl<'a> Message<'a> {
    /// Tries to deserialize a buffer into an ICMP message.
    pub fn deserialize(buffer: &'a [u8]) -> Result<Message<'a>> {
        let packet = Packet::try_new(buffer)?;

        let echo = || -> Result<Echo<'a>> {
            if buffer.len() < Echo::HEADER_LEN {
                return Err(Error::TooShort);
            }

            let mut timestamp = [0; 8];
            timestamp.copy_from_slice(&buffer[fields::ECHO_TIMESTAMP]);

            Ok(Echo {
                id: (&buffer[fields::ECHO_ID]).read_u16::<NetworkEndian>()?,
                seq: (&buffer[fields::ECHO_SEQ]).read_u16::<NetworkEndian>()?,
                timestamp,
                data: &buffer[fields::ECHO_DATA],
            })
        };

        let error_data = || buffer.get(fields::ERROR_DATA).unwrap_or(&[]);

        match packet._type() {
            types::ECHO_REPLY => Ok(Message::EchoReply(echo()?)),
            types::ECHO_REQUEST => Ok(Message::EchoRequest(echo()?)),
            types::DESTINATION_UNREACHABLE => Ok(Message::DestinationUnreachable {
                code: packet.code(),
                data: error_data(),
            }),
            types::TIME_EXCEEDED => Ok(Message::TimeExceeded {
                code: packet.code(),
                data: error_data(),
            }),
            type_of => Ok(Message::Other {
                type_of,
                code: packet.code(),
            }),
        }
    }
}
