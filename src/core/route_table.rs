use std::result::Result as StdResult;
use std::str::FromStr;

use crate::core::repr::{
    Ipv4Address,
    Ipv4AddressCidr,
};
use crate::core::InterfaceId;
use crate::{
    Error,
    Result,
};

/// Where packets matching a prefix are sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// A directly attached network, reachable through an interface.
    Connected(InterfaceId),
    /// A remote network, reachable through a next hop router.
    Network(Ipv4Address),
}

/// A network route given on the command line as PREFIX/LEN,NEXT_HOP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticRoute {
    pub prefix: Ipv4AddressCidr,
    pub next_hop: Ipv4Address,
}

impl FromStr for StaticRoute {
    type Err = ();

    fn from_str(route: &str) -> StdResult<StaticRoute, Self::Err> {
        let mut tokens = route.splitn(2, ',');
        let prefix = tokens.next().ok_or(())?.trim().parse::<Ipv4AddressCidr>()?;
        let next_hop = tokens.next().ok_or(())?.trim().parse::<Ipv4Address>()?;
        Ok(StaticRoute { prefix, next_hop })
    }
}

#[derive(Debug, Default)]
struct Node {
    depth: u32,
    children: [Option<Box<Node>>; 2],
    route: Option<Route>,
}

impl Node {
    fn with_depth(depth: u32) -> Node {
        Node {
            depth,
            ..Node::default()
        }
    }
}

/// A binary radix trie over the 32 bit IPv4 address space providing longest
/// prefix match lookups.
#[derive(Debug, Default)]
pub struct RouteTable {
    root: Node,
}

/// Returns bit i (0 = most significant) of an address.
fn bit(addr: u32, i: u32) -> usize {
    ((addr >> (31 - i)) & 0x01) as usize
}

impl RouteTable {
    pub fn new() -> RouteTable {
        RouteTable::default()
    }

    /// Adds or replaces the route for the first prefix_len bits of prefix.
    pub fn insert(&mut self, prefix: Ipv4Address, prefix_len: u32, route: Route) -> Result<()> {
        if prefix_len > 32 {
            return Err(Error::Malformed);
        }

        let prefix = prefix.as_u32();
        let mut node = &mut self.root;

        for i in 0 .. prefix_len {
            node = &mut **node.children[bit(prefix, i)]
                .get_or_insert_with(|| Box::new(Node::with_depth(i + 1)));
        }

        debug_assert_eq!(node.depth, prefix_len);
        node.route = Some(route);
        Ok(())
    }

    /// Adds a connected route for the network an interface address belongs to.
    pub fn add_connected(&mut self, addr: &Ipv4AddressCidr, interface: InterfaceId) -> Result<()> {
        self.insert(addr.network(), addr.prefix_len(), Route::Connected(interface))
    }

    /// Adds a route to a remote network via a next hop router.
    pub fn add_static(&mut self, route: &StaticRoute) -> Result<()> {
        self.insert(
            route.prefix.network(),
            route.prefix.prefix_len(),
            Route::Network(route.next_hop),
        )
    }

    /// Returns the route of the longest inserted prefix matching an address.
    pub fn lookup(&self, addr: Ipv4Address) -> Option<Route> {
        let addr = addr.as_u32();
        let mut node = &self.root;
        let mut best = node.route;

        for i in 0 .. 32 {
            node = match node.children[bit(addr, i)] {
                Some(ref child) => &**child,
                None => break,
            };

            if node.route.is_some() {
                best = node.route;
            }
        }

        best
    }
}
