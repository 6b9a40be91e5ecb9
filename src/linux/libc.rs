use byteorder::{
    NativeEndian,
    ReadBytesExt,
};

pub const ETH_P_ALL: u16 = 0x0003;

pub const ARPHRD_ETHER: u16 = 1;

pub const SIOCGIFMTU: libc::c_ulong = 0x8921;

pub const SIOCGIFHWADDR: libc::c_ulong = 0x8927;

#[repr(C)]
#[derive(Clone, Copy)]
/// [https://linux.die.net/man/7/netdevice](https://linux.die.net/man/7/netdevice)
pub struct c_ifreq {
    pub ifr_name: [libc::c_char; libc::IF_NAMESIZE],
    pub ifr_data: [u8; 24], // ifr_hwaddr, ifr_mtu, etc.
}

impl c_ifreq {
    pub fn with_name(ifr_name: &str) -> c_ifreq {
        assert!(ifr_name.len() < libc::IF_NAMESIZE);

        let mut ifreq = c_ifreq {
            ifr_name: [0; libc::IF_NAMESIZE],
            ifr_data: [0; 24],
        };

        for (i, c) in ifr_name.as_bytes().iter().enumerate() {
            ifreq.ifr_name[i] = *c as libc::c_char;
        }

        ifreq
    }

    /// Reads ifr_mtu after a SIOCGIFMTU request.
    pub fn ifr_mtu(&self) -> libc::c_int {
        (&self.ifr_data[0 .. 4]).read_i32::<NativeEndian>().unwrap()
    }

    /// Reads the family and first 6 address bytes of ifr_hwaddr after a
    /// SIOCGIFHWADDR request.
    pub fn ifr_hwaddr(&self) -> (u16, [u8; 6]) {
        let family = (&self.ifr_data[0 .. 2]).read_u16::<NativeEndian>().unwrap();
        let mut addr = [0; 6];
        addr.copy_from_slice(&self.ifr_data[2 .. 8]);
        (family, addr)
    }
}
