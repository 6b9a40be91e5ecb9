use std::collections::HashMap;

use crate::core::repr::{
    EthernetAddress,
    Ipv4Address,
};
use crate::core::InterfaceId;

#[derive(Clone, Copy, Debug)]
struct Entry {
    eth_addr: EthernetAddress,
    interface: InterfaceId,
}

/// Maintains a set of IPv4 -> (ethernet address, interface) mappings.
///
/// Entries never expire and are only ever overwritten by newer mappings for
/// the same IPv4 address.
#[derive(Debug, Default)]
pub struct ArpCache {
    entries: HashMap<Ipv4Address, Entry>,
}

impl ArpCache {
    pub fn new() -> ArpCache {
        ArpCache::default()
    }

    /// Lookup the ethernet address for an IPv4 address, along with the
    /// interface the mapping was learned on.
    pub fn eth_addr_for_ip(&self, ipv4_addr: Ipv4Address) -> Option<(EthernetAddress, InterfaceId)> {
        self.entries
            .get(&ipv4_addr)
            .map(|entry| (entry.eth_addr, entry.interface))
    }

    /// Create or update the ethernet address mapping for an IPv4 address.
    pub fn set_eth_addr_for_ip(
        &mut self,
        ipv4_addr: Ipv4Address,
        eth_addr: EthernetAddress,
        interface: InterfaceId,
    ) {
        self.entries.insert(ipv4_addr, Entry { eth_addr, interface });
    }

    /// Returns the number of mappings in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
