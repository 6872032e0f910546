#![allow(dead_code)]

use crossbeam::channel::Receiver;
use epona_packets::MacAddr;
use epona_runtime::adapter::{Adapter, AdapterConfig};
use epona_runtime::phy::Link;
use epona_runtime::utils::test::InputCollector;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// An adapter together with everything its network layer has been handed.
pub struct Host {
    pub adapter: Arc<Adapter>,
    delivered: Receiver<(u16, Vec<u8>)>,
}

impl Host {
    pub fn new(mac: [u8; 6], iface: &str, gateway: &str) -> Host {
        let (input, delivered) = InputCollector::new();
        let config = AdapterConfig::new(
            MacAddr::new(mac),
            iface.parse().unwrap(),
            gateway.parse().unwrap(),
        );
        Host {
            adapter: Adapter::new(config, input),
            delivered,
        }
    }

    pub fn plugged(self, link: Arc<dyn Link>) -> Host {
        self.adapter.plug(link);
        self
    }

    pub fn hwaddr(&self) -> MacAddr {
        self.adapter.hwaddr()
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.adapter.config().ip()
    }

    /// Everything delivered since the last call.
    pub fn delivered(&self) -> Vec<(u16, Vec<u8>)> {
        self.delivered.try_iter().collect()
    }
}

pub fn mac_from_hex(hex: &str) -> [u8; 6] {
    let mut mac = [0; 6];
    for (n, byte) in mac.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[n * 2..n * 2 + 2], 16).unwrap();
    }
    mac
}
