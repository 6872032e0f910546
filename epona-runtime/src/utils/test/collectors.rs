use crate::adapter::Input;
use crate::phy::{Link, Node, NodeId};
use crate::utils::lock;
use crate::EponaError;
use crossbeam::channel::{self, Receiver, Sender};
use epona_packets::{EponaFrame, MareFrame, MareOp, MARE_PROTONUM};
use std::convert::TryFrom;
use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

/// A node that records every frame its link delivers to it, valid or not. It can also put raw
/// bytes on its link, which is how tests forge frames no adapter would produce.
pub struct FrameCollector {
    id: NodeId,
    link: Mutex<Option<Arc<dyn Link>>>,
    frames: Mutex<Vec<(Instant, Vec<u8>)>>,
}

impl FrameCollector {
    pub fn new() -> Arc<FrameCollector> {
        Arc::new(FrameCollector {
            id: NodeId::next(),
            link: Mutex::new(None),
            frames: Mutex::new(vec![]),
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn plug(self: &Arc<Self>, link: Arc<dyn Link>) {
        self.unplug();
        let weak = Arc::downgrade(self);
        let node: Weak<dyn Node> = weak;
        link.attach(self.id, node);
        *lock(&self.link) = Some(link);
    }

    pub fn unplug(&self) {
        if let Some(link) = lock(&self.link).take() {
            link.detach(self.id);
        }
    }

    /// Transmits `frame` verbatim. Does nothing when unplugged.
    pub fn inject(&self, frame: &[u8]) -> Result<(), EponaError> {
        let link = lock(&self.link).clone();
        match link {
            Some(link) => link.tx(self.id, frame),
            None => Ok(()),
        }
    }

    pub fn count(&self) -> usize {
        lock(&self.frames).len()
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        lock(&self.frames)
            .iter()
            .map(|(_, frame)| frame.clone())
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.frames).clear();
    }

    /// Received frames that pass the integrity check.
    pub fn valid_frames(&self) -> Vec<EponaFrame> {
        lock(&self.frames)
            .iter()
            .filter_map(|(_, frame)| EponaFrame::decode(frame).ok())
            .collect()
    }

    /// Valid MARE messages received, with the frame's destination address.
    pub fn mare_messages(&self) -> Vec<(EponaFrame, MareFrame)> {
        self.valid_frames()
            .into_iter()
            .filter(|frame| frame.protonum() == MARE_PROTONUM)
            .filter_map(|frame| {
                let message = MareFrame::try_from(&frame.payload()[..]).ok()?;
                Some((frame, message))
            })
            .collect()
    }

    pub fn mare_requests(&self) -> usize {
        self.mare_messages()
            .iter()
            .filter(|(_, message)| message.op == MareOp::Request)
            .count()
    }

    /// When each valid MARE request arrived, in arrival order.
    pub fn mare_request_times(&self) -> Vec<Instant> {
        lock(&self.frames)
            .iter()
            .filter(|(_, frame)| {
                EponaFrame::decode(frame)
                    .ok()
                    .filter(|frame| frame.protonum() == MARE_PROTONUM)
                    .and_then(|frame| MareFrame::try_from(&frame.payload()[..]).ok())
                    .map_or(false, |message| message.op == MareOp::Request)
            })
            .map(|(arrived, _)| *arrived)
            .collect()
    }
}

impl Node for FrameCollector {
    fn rx_link(&self, frame: &[u8]) {
        lock(&self.frames).push((Instant::now(), frame.to_vec()));
    }
}

/// Network layer stand-in that forwards every delivered datagram into a channel.
pub struct InputCollector {
    delivered: Sender<(u16, Vec<u8>)>,
}

impl InputCollector {
    pub fn new() -> (InputCollector, Receiver<(u16, Vec<u8>)>) {
        let (delivered, receiver) = channel::unbounded();
        (InputCollector { delivered }, receiver)
    }
}

impl Input for InputCollector {
    fn input(&self, protonum: u16, dgram: Vec<u8>) {
        // Tests that stop listening early just lose the rest.
        let _ = self.delivered.send((protonum, dgram));
    }
}
