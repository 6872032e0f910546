use cidr::{Ipv4Cidr, Ipv4Inet};
use epona_packets::MacAddr;
use std::net::Ipv4Addr;

/// Addressing an adapter is configured with. Immutable once the adapter exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdapterConfig {
    hwaddr: MacAddr,
    iface: Ipv4Inet,
    gateway: Ipv4Addr,
}

impl AdapterConfig {
    /// `iface` is the adapter's own address together with the prefix length of its subnet, e.g.
    /// `10.0.0.1/24`.
    pub fn new(hwaddr: MacAddr, iface: Ipv4Inet, gateway: Ipv4Addr) -> Self {
        AdapterConfig {
            hwaddr,
            iface,
            gateway,
        }
    }

    pub fn hwaddr(&self) -> MacAddr {
        self.hwaddr
    }

    pub fn iface(&self) -> Ipv4Inet {
        self.iface
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.iface.address()
    }

    pub fn network(&self) -> Ipv4Cidr {
        self.iface.network()
    }

    pub fn gateway(&self) -> Ipv4Addr {
        self.gateway
    }

    /// The address whose hardware address a datagram for `addr` must be framed with: `addr`
    /// itself when it is on our subnet, the gateway otherwise.
    pub fn next_hop(&self, addr: Ipv4Addr) -> Ipv4Addr {
        if self.network().contains(&addr) {
            addr
        } else {
            self.gateway
        }
    }
}
