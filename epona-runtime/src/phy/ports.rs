use crate::phy::{Link, Node, NodeId};
use crate::utils::lock;
use crate::EponaError;
use std::sync::{Arc, Mutex, Weak};

/// A node with several numbered ports, each of which may be plugged into its own link.
pub trait MultiportNode: Send + Sync {
    /// Called when a frame arrives on `port`.
    fn rx(&self, port: usize, frame: &[u8]);
}

/// What a multiport node looks like from one of its links: a plain node that tags every frame with
/// the port it came in on.
struct PortEndpoint {
    id: NodeId,
    port: usize,
    owner: Weak<dyn MultiportNode>,
}

impl Node for PortEndpoint {
    fn rx_link(&self, frame: &[u8]) {
        if let Some(owner) = self.owner.upgrade() {
            owner.rx(self.port, frame);
        }
    }
}

struct Attachment {
    link: Arc<dyn Link>,
    endpoint: Arc<PortEndpoint>,
}

/// Port table of a multiport node.
pub struct Ports {
    slots: Mutex<Vec<Option<Attachment>>>,
    nports: usize,
}

impl Ports {
    pub fn new(nports: usize) -> Self {
        let mut slots = Vec::with_capacity(nports);
        slots.resize_with(nports, || None);
        Ports {
            slots: Mutex::new(slots),
            nports,
        }
    }

    pub fn nports(&self) -> usize {
        self.nports
    }

    fn check(&self, port: usize) -> Result<(), EponaError> {
        if port >= self.nports {
            return Err(EponaError::InvalidPort {
                port,
                nports: self.nports,
            });
        }
        Ok(())
    }

    /// Plugs `port` into `link`, unplugging whatever it was plugged into before. Frames arriving
    /// on the link are handed to `owner`.
    pub fn plug(
        &self,
        owner: Weak<dyn MultiportNode>,
        port: usize,
        link: Arc<dyn Link>,
    ) -> Result<(), EponaError> {
        self.unplug(port)?;

        let endpoint = Arc::new(PortEndpoint {
            id: NodeId::next(),
            port,
            owner,
        });
        let weak = Arc::downgrade(&endpoint);
        let node: Weak<dyn Node> = weak;
        link.attach(endpoint.id, node);

        lock(&self.slots)[port] = Some(Attachment { link, endpoint });
        Ok(())
    }

    pub fn unplug(&self, port: usize) -> Result<(), EponaError> {
        self.check(port)?;
        let previous = lock(&self.slots)[port].take();
        if let Some(attachment) = previous {
            attachment.link.detach(attachment.endpoint.id);
        }
        Ok(())
    }

    pub fn is_attached(&self, port: usize) -> bool {
        lock(&self.slots)
            .get(port)
            .map_or(false, |slot| slot.is_some())
    }

    /// Transmits `frame` on the link plugged into `outport`. A port with no link is a no-op.
    pub fn forward(&self, outport: usize, frame: &[u8]) -> Result<(), EponaError> {
        self.check(outport)?;
        let target = lock(&self.slots)[outport]
            .as_ref()
            .map(|attachment| (attachment.link.clone(), attachment.endpoint.id));
        match target {
            Some((link, id)) => link.tx(id, frame),
            None => Ok(()),
        }
    }
}

impl Drop for Ports {
    fn drop(&mut self) {
        for attachment in lock(&self.slots).drain(..).flatten() {
            attachment.link.detach(attachment.endpoint.id);
        }
    }
}
