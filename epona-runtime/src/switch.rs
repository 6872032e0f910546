use crate::phy::{Link, MultiportNode, Ports};
use crate::utils::lock;
use crate::EponaError;
use epona_packets::{EponaFrame, MacAddr};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tracing::{trace, warn};

/// Where a switch sends a frame it accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Forwarding {
    /// Out of every port with a link, except the one it came in on.
    Flood,
    Forward(usize),
    /// The destination lives on the ingress port; it has already seen the frame.
    Drop,
}

pub struct Switch {
    ports: Ports,
    table: Mutex<HashMap<MacAddr, usize>>,
}

impl Switch {
    pub fn new(nports: usize) -> Arc<Switch> {
        Arc::new(Switch {
            ports: Ports::new(nports),
            table: Mutex::new(HashMap::new()),
        })
    }

    pub fn nports(&self) -> usize {
        self.ports.nports()
    }

    pub fn plug(self: &Arc<Self>, port: usize, link: Arc<dyn Link>) -> Result<(), EponaError> {
        let weak = Arc::downgrade(self);
        let owner: Weak<dyn MultiportNode> = weak;
        self.ports.plug(owner, port, link)
    }

    pub fn unplug(&self, port: usize) -> Result<(), EponaError> {
        self.ports.unplug(port)
    }

    /// Port on which `mac` was last seen as a source.
    pub fn lookup(&self, mac: MacAddr) -> Option<usize> {
        lock(&self.table).get(&mac).copied()
    }

    /// Learns that `frame`'s source lives behind `port` and decides where `frame` goes next.
    pub fn decide(&self, port: usize, frame: &EponaFrame) -> Forwarding {
        let dest = frame.dest_mac();
        let mut table = lock(&self.table);
        table.insert(frame.src_mac(), port);

        if dest.is_broadcast() {
            return Forwarding::Flood;
        }
        match table.get(&dest) {
            None => Forwarding::Flood,
            Some(&outport) if outport == port => Forwarding::Drop,
            Some(&outport) => Forwarding::Forward(outport),
        }
    }
}

impl MultiportNode for Switch {
    fn rx(&self, port: usize, frame: &[u8]) {
        let decoded = match EponaFrame::decode(frame) {
            Ok(decoded) => decoded,
            Err(reason) => {
                trace!(port, reason, "switch dropped frame");
                return;
            }
        };

        match self.decide(port, &decoded) {
            Forwarding::Flood => {
                for outport in (0..self.nports()).filter(|&p| p != port) {
                    if !self.ports.is_attached(outport) {
                        continue;
                    }
                    if let Err(err) = self.ports.forward(outport, frame) {
                        warn!(outport, %err, "switch failed to flood frame");
                    }
                }
            }
            Forwarding::Forward(outport) => {
                if let Err(err) = self.ports.forward(outport, frame) {
                    warn!(outport, %err, "switch failed to forward frame");
                }
            }
            Forwarding::Drop => {
                trace!(port, dest = %decoded.dest_mac(), "destination is on ingress port")
            }
        }
    }
}
