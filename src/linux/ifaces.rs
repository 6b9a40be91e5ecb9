use std::ffi::CStr;
use std::io;

use get_if_addrs::IfAddr;

use crate::core::dev::Device;
use crate::core::repr::{
    Ipv4Address,
    Ipv4AddressCidr,
};
use crate::core::service::Interface;
use crate::linux::dev::RawSocket;
use crate::{
    Error,
    Result,
};

lazy_static! {
    /// Interfaces which never route, regardless of the command line.
    pub static ref IGNORED_INTERFACES: Vec<&'static str> = {
        vec!["lo", "bond0", "dummy0", "tunl0", "sit0"]
    };
}

/// Opens a raw socket on every interface of the host except ignored ones.
///
/// Interfaces without an IPv4 address are still opened, but never have
/// packets delivered locally or routed to them.
pub fn enumerate(ignored: &[String]) -> Result<Vec<Interface<RawSocket>>> {
    let if_addrs = get_if_addrs::get_if_addrs()?;
    let mut interfaces = vec![];

    for (name, index) in name_index()? {
        if is_ignored(&name, ignored) {
            debug!("Skipping ignored interface {}.", name);
            continue;
        }

        let dev = RawSocket::new(&name, index)?;
        let ethernet_addr = dev.ethernet_addr(&name)?;
        let ipv4_addr = ipv4_addr_for(&name, &if_addrs);

        info!(
            "Opened interface {} (MTU = {}, MAC = {}, IPv4 = {}).",
            name,
            dev.max_transmission_unit(),
            ethernet_addr,
            ipv4_addr
        );

        interfaces.push(Interface::new(&name, dev, ethernet_addr, ipv4_addr));
    }

    Ok(interfaces)
}

/// Checks if an interface is skipped by default or by request.
pub fn is_ignored(name: &str, ignored: &[String]) -> bool {
    IGNORED_INTERFACES.iter().any(|i| *i == name) || ignored.iter().any(|i| i == name)
}

/// Returns the first IPv4 address of an interface, or the unspecified address
/// if it has none.
pub fn ipv4_addr_for(name: &str, if_addrs: &[get_if_addrs::Interface]) -> Ipv4AddressCidr {
    if_addrs
        .iter()
        .filter(|if_addr| if_addr.name == name)
        .filter_map(|if_addr| match if_addr.addr {
            IfAddr::V4(ref addr) => Some(Ipv4AddressCidr::with_mask(
                Ipv4Address::new(addr.ip.octets()),
                Ipv4Address::new(addr.netmask.octets()),
            )),
            _ => None,
        })
        .next()
        .unwrap_or_else(|| Ipv4AddressCidr::new(Ipv4Address::UNSPECIFIED, 0))
}

/// [if_nameindex](http://man7.org/linux/man-pages/man3/if_nameindex.3.html)
fn name_index() -> Result<Vec<(String, u32)>> {
    let mut names = vec![];

    unsafe {
        let head = libc::if_nameindex();
        if head.is_null() {
            return Err(Error::Io(io::Error::last_os_error()));
        }

        let mut next = head;
        while (*next).if_index != 0 && !(*next).if_name.is_null() {
            let name = CStr::from_ptr((*next).if_name).to_string_lossy().into_owned();
            names.push((name, (*next).if_index as u32));
            next = next.offset(1);
        }

        libc::if_freenameindex(head);
    }

    Ok(names)
}
