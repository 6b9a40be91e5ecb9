use std::io;
use std::mem;
use std::os::unix::io::{
    AsRawFd,
    RawFd,
};

use crate::core::dev::Device;
use crate::core::repr::EthernetAddress;
use crate::linux::libc as _libc;
use crate::{
    Error,
    Result,
};

/// The interface MTU excludes the Ethernet header.
const ETHERNET_HEADER_LEN: usize = 14;

/// [Packet socket](http://man7.org/linux/man-pages/man7/packet.7.html) for
/// sending and receiving raw ethernet frames on a single interface.
pub struct RawSocket {
    fd: libc::c_int,
    max_transmission_unit: usize,
}

impl RawSocket {
    /// Opens a packet socket bound to the interface with the specified name
    /// and index.
    pub fn new(ifr_name: &str, ifindex: u32) -> Result<RawSocket> {
        let protocol = _libc::ETH_P_ALL.to_be();

        let fd = unsafe { libc::socket(libc::AF_PACKET, libc::SOCK_RAW, protocol as libc::c_int) };
        if fd == -1 {
            return Err(Error::Io(io::Error::last_os_error()));
        }

        // Close the socket on early returns.
        let mut socket = RawSocket {
            fd,
            max_transmission_unit: 0,
        };

        let mut sockaddr: libc::sockaddr_ll = unsafe { mem::zeroed() };
        sockaddr.sll_family = libc::AF_PACKET as u16;
        sockaddr.sll_protocol = protocol;
        sockaddr.sll_ifindex = ifindex as libc::c_int;

        let bound = unsafe {
            libc::bind(
                fd,
                &sockaddr as *const libc::sockaddr_ll as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };
        if bound == -1 {
            return Err(Error::Io(io::Error::last_os_error()));
        }

        let mut ifreq = _libc::c_ifreq::with_name(ifr_name);
        socket.ioctl(_libc::SIOCGIFMTU, &mut ifreq)?;
        socket.max_transmission_unit = ifreq.ifr_mtu() as usize + ETHERNET_HEADER_LEN;

        Ok(socket)
    }

    /// Reads the hardware address of an interface.
    pub fn ethernet_addr(&self, ifr_name: &str) -> Result<EthernetAddress> {
        let mut ifreq = _libc::c_ifreq::with_name(ifr_name);
        self.ioctl(_libc::SIOCGIFHWADDR, &mut ifreq)?;

        match ifreq.ifr_hwaddr() {
            (_libc::ARPHRD_ETHER, addr) => Ok(EthernetAddress::new(addr)),
            _ => Err(Error::Malformed),
        }
    }

    fn ioctl(&self, request: libc::c_ulong, ifreq: &mut _libc::c_ifreq) -> Result<()> {
        unsafe {
            if libc::ioctl(self.fd, request as _, ifreq as *mut _libc::c_ifreq) == -1 {
                return Err(Error::Io(io::Error::last_os_error()));
            }
        }

        Ok(())
    }
}

impl Device for RawSocket {
    fn send(&mut self, buffer: &[u8]) -> Result<()> {
        let wrote = unsafe {
            libc::send(
                self.fd,
                buffer.as_ptr() as *const libc::c_void,
                buffer.len(),
                0,
            )
        };

        if wrote < 0 {
            Err(Error::Io(io::Error::last_os_error()))
        } else {
            Ok(())
        }
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let read = unsafe {
            libc::recv(
                self.fd,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
                libc::MSG_DONTWAIT,
            )
        };

        if read < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::WouldBlock {
                Err(Error::Exhausted)
            } else {
                Err(Error::Io(err))
            }
        } else {
            Ok(read as usize)
        }
    }

    fn max_transmission_unit(&self) -> usize {
        self.max_transmission_unit
    }
}

impl AsRawFd for RawSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for RawSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
