use byteorder::{
    NetworkEndian,
    ReadBytesExt,
};

/// Calculates the Internet Checksum from [RFC1071](https://tools.ietf.org/html/rfc1071).
///
/// A trailing odd byte is treated as the high byte of a word padded with zero.
/// See [IPv4 header checksum](https://en.wikipedia.org/wiki/IPv4_header_checksum) for an example.
pub fn internet_checksum(buffer: &[u8]) -> u16 {
    let mut acc = 0 as u32;

    for mut word in buffer.chunks(2) {
        acc += if word.len() == 2 {
            word.read_u16::<NetworkEndian>().unwrap() as u32
        } else {
            (word[0] as u32) << 8
        };
    }

    while acc >> 16 != 0 {
        acc = (acc & 0xFFFF) + (acc >> 16);
    }

    !acc as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internet_checksum() {
        let buffer: [u8; 20] = [
            0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00, 0xc0, 0xa8,
            0x00, 0x01, 0xc0, 0xa8, 0x00, 0xc7,
        ];
        assert_eq!(0xB861, internet_checksum(&buffer));
    }

    #[test]
    fn test_internet_checksum_odd_length() {
        // 0x0102 + 0x0300 = 0x0402
        assert_eq!(!0x0402, internet_checksum(&[0x01, 0x02, 0x03]));
    }

    #[test]
    fn test_internet_checksum_folds_carries() {
        // 0xFFFF * 3 = 0x2FFFD -> 0xFFFF
        assert_eq!(0x0000, internet_checksum(&[0xFF; 6]));
    }

    #[test]
    fn test_internet_checksum_validates_to_zero() {
        let mut buffer: [u8; 20] = [
            0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00, 0xc0, 0xa8,
            0x00, 0x01, 0xc0, 0xa8, 0x00, 0xc7,
        ];
        let checksum = internet_checksum(&buffer);
        buffer[10] = (checksum >> 8) as u8;
        buffer[11] = checksum as u8;
        assert_eq!(0, internet_checksum(&buffer));
    }
}
