use cidr::{Ipv4Cidr, Ipv4Inet};
use epona_packets::MacAddr;
use epona_runtime::adapter::{Adapter, AdapterConfig};
use epona_runtime::phy::BroadcastLink;
use epona_runtime::repeater::Repeater;
use epona_runtime::switch::Switch;
use epona_runtime::EponaError;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Every host and the gateway on its own link, all joined by one switch. Host 0 can optionally
/// reach the switch through a repeater instead.
pub struct Lan {
    pub hosts: Vec<Arc<Adapter>>,
    pub gateway: Arc<Adapter>,
    pub switch: Arc<Switch>,
    // Host 0's link, the one its frames leave on.
    uplink: Arc<BroadcastLink>,
    _repeater: Option<Arc<Repeater>>,
    unused: Ipv4Addr,
}

fn hwaddr(n: u16) -> MacAddr {
    let [hi, lo] = n.to_be_bytes();
    MacAddr::new([0x02, 0x45, 0x50, 0x00, hi, lo])
}

fn announce(name: String) -> impl Fn(u16, Vec<u8>) + Send + Sync {
    move |protonum: u16, dgram: Vec<u8>| {
        println!(
            "  {} received {:#06x}: {:?}",
            name,
            protonum,
            String::from_utf8_lossy(&dgram)
        )
    }
}

impl Lan {
    pub fn build(subnet: Ipv4Cidr, nhosts: u16, with_repeater: bool) -> Result<Lan, String> {
        let len = subnet.network_length();
        let size = 1u64 << (32 - u32::from(len));
        // Network address, hosts, one spare address, gateway, broadcast.
        if u64::from(nhosts) + 4 > size {
            return Err(format!("subnet {} is too small for {} hosts", subnet, nhosts));
        }
        let base = u32::from(subnet.first_address());
        let gateway_ip = Ipv4Addr::from(base + (size - 2) as u32);
        let inet = |addr: Ipv4Addr| Ipv4Inet::new(addr, len).map_err(|err| err.to_string());

        let switch = Switch::new(usize::from(nhosts) + 1);
        let plug_switch = |port: usize, name: String| -> Result<Arc<BroadcastLink>, String> {
            let link = BroadcastLink::new(&name);
            switch
                .plug(port, link.clone())
                .map_err(|err: EponaError| err.to_string())?;
            Ok(link)
        };

        let gateway = Adapter::new(
            AdapterConfig::new(hwaddr(0xfffe), inet(gateway_ip)?, Ipv4Addr::UNSPECIFIED),
            announce("gateway".to_string()),
        );
        gateway.plug(plug_switch(usize::from(nhosts), "gateway".to_string())?);

        let mut hosts = Vec::with_capacity(usize::from(nhosts));
        let mut repeater = None;
        let mut uplink = None;
        for n in 0..nhosts {
            let name = format!("host{}", n);
            let ip = Ipv4Addr::from(base + 1 + u32::from(n));
            let host = Adapter::new(
                AdapterConfig::new(hwaddr(n), inet(ip)?, gateway_ip),
                announce(name.clone()),
            );
            let link = plug_switch(usize::from(n), name.clone())?;
            if n == 0 && with_repeater {
                let spur = BroadcastLink::new(&format!("{}-spur", name));
                let hub = Repeater::new(2);
                hub.plug(0, spur.clone()).map_err(|err| err.to_string())?;
                hub.plug(1, link).map_err(|err| err.to_string())?;
                host.plug(spur.clone());
                uplink = Some(spur);
                repeater = Some(hub);
            } else {
                host.plug(link.clone());
                if n == 0 {
                    uplink = Some(link);
                }
            }
            hosts.push(host);
        }

        Ok(Lan {
            hosts,
            gateway,
            switch,
            uplink: uplink.ok_or_else(|| "a LAN needs at least one host".to_string())?,
            _repeater: repeater,
            unused: Ipv4Addr::from(base + 1 + u32::from(nhosts)),
        })
    }

    pub fn uplink(&self) -> &BroadcastLink {
        &self.uplink
    }

    /// An address on the subnet that no adapter owns.
    pub fn unused_address(&self) -> Ipv4Addr {
        self.unused
    }
}
