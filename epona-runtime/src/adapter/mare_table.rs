use epona_packets::MacAddr;
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Translations learned from MARE traffic. Entries never expire; a newer observation for the same
/// address replaces the older one.
pub(crate) struct MareTable {
    ipv4_mac_translations: HashMap<Ipv4Addr, MacAddr>,
}

impl MareTable {
    pub fn new() -> Self {
        MareTable {
            ipv4_mac_translations: HashMap::new(),
        }
    }

    pub fn get(&self, addr: &Ipv4Addr) -> Option<MacAddr> {
        self.ipv4_mac_translations.get(addr).copied()
    }

    pub fn insert(&mut self, addr: Ipv4Addr, mac: MacAddr) -> Option<MacAddr> {
        self.ipv4_mac_translations.insert(addr, mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_observation_wins() {
        let mut table = MareTable::new();
        let addr = Ipv4Addr::new(10, 0, 0, 2);
        assert_eq!(table.insert(addr, MacAddr::new([1; 6])), None);
        assert_eq!(
            table.insert(addr, MacAddr::new([2; 6])),
            Some(MacAddr::new([1; 6]))
        );
        assert_eq!(table.get(&addr), Some(MacAddr::new([2; 6])));
        assert_eq!(table.get(&Ipv4Addr::new(10, 0, 0, 3)), None);
    }
}
