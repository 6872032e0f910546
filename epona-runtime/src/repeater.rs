use crate::phy::{Link, MultiportNode, Ports};
use crate::EponaError;
use std::sync::{Arc, Weak};
use tracing::warn;

pub struct Repeater {
    ports: Ports,
}

impl Repeater {
    pub fn new(nports: usize) -> Arc<Repeater> {
        Arc::new(Repeater {
            ports: Ports::new(nports),
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
}

impl MultiportNode for Repeater {
    fn rx(&self, port: usize, frame: &[u8]) {
        for outport in (0..self.nports()).filter(|&p| p != port) {
            if let Err(err) = self.ports.forward(outport, frame) {
                warn!(outport, %err, "repeater failed to forward frame");
            }
        }
    }
}
