use crate::phy::{Link, Node, NodeId};
use crate::utils::lock;
use crate::EponaError;
use crossbeam::atomic::AtomicCell;
use rand::Rng;
use std::env;
use std::fmt::Write;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, trace};

/// Environment variable that turns on frame hexdumps for every link created without an explicit
/// debug setting.
pub const NET_DEBUG_VAR: &str = "NET_DEBUG";

/// A shared segment: every frame transmitted by one attached node is delivered to all the others,
/// in the order it was transmitted, before `tx` returns.
pub struct BroadcastLink {
    name: String,
    debug: bool,
    nodes: Mutex<Vec<(NodeId, Weak<dyn Node>)>>,
    corrupt: AtomicCell<bool>,
}

impl BroadcastLink {
    pub fn new(name: &str) -> Arc<BroadcastLink> {
        BroadcastLink::with_debug(name, env::var_os(NET_DEBUG_VAR).is_some())
    }

    pub fn with_debug(name: &str, debug: bool) -> Arc<BroadcastLink> {
        Arc::new(BroadcastLink {
            name: name.to_string(),
            debug,
            nodes: Mutex::new(Vec::new()),
            corrupt: AtomicCell::new(false),
        })
    }

    /// Introduces a single-bit error into the next frame transmitted on this link.
    pub fn corrupt_next(&self) {
        self.corrupt.store(true);
    }

    /// Number of live nodes attached to this link.
    pub fn attached(&self) -> usize {
        let mut nodes = lock(&self.nodes);
        nodes.retain(|(_, node)| node.strong_count() > 0);
        nodes.len()
    }
}

impl Link for BroadcastLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn attach(&self, id: NodeId, node: Weak<dyn Node>) {
        let mut nodes = lock(&self.nodes);
        if !nodes.iter().any(|(attached, _)| *attached == id) {
            nodes.push((id, node));
        }
    }

    fn detach(&self, id: NodeId) {
        lock(&self.nodes).retain(|(attached, _)| *attached != id);
    }

    fn tx(&self, sender: NodeId, frame: &[u8]) -> Result<(), EponaError> {
        // Snapshot the receivers so none of them run with the node list locked; delivery may
        // transmit again on this same link.
        let receivers: Vec<Arc<dyn Node>> = {
            let mut nodes = lock(&self.nodes);
            nodes.retain(|(_, node)| node.strong_count() > 0);
            if !nodes.iter().any(|(id, _)| *id == sender) {
                return Err(EponaError::UnattachedSender(self.name.clone()));
            }
            nodes
                .iter()
                .filter(|(id, _)| *id != sender)
                .filter_map(|(_, node)| node.upgrade())
                .collect()
        };

        let corrupted = self.corrupt.swap(false);
        let mut frame = frame.to_vec();
        if corrupted && !frame.is_empty() {
            let mut rng = rand::thread_rng();
            let pos = rng.gen_range(0, frame.len());
            let bit: u8 = rng.gen_range(0, 8);
            frame[pos] ^= 1u8 << bit;
            trace!(link = %self.name, pos, "corrupted frame in flight");
        }

        if self.debug {
            debug!(
                "Frame on link {:?}{}:\n{}",
                self.name,
                if corrupted { " (CORRUPTED)" } else { "" },
                hexdump(&frame)
            );
        }

        for node in receivers {
            node.rx_link(&frame);
        }
        Ok(())
    }
}

/// Canonical hex+ASCII dump, 16 bytes per line, followed by the total length.
pub fn hexdump(data: &[u8]) -> String {
    let mut out = String::new();
    for (line_no, line) in data.chunks(16).enumerate() {
        let hex = |bytes: &[u8]| {
            bytes
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let (first, second) = line.split_at(line.len().min(8));
        let disp: String = line
            .iter()
            .map(|&c| if (32..128).contains(&c) { c as char } else { '.' })
            .collect();
        let _ = writeln!(
            out,
            "{:08x}  {:<23}  {:<23}  |{}|",
            line_no * 16,
            hex(first),
            hex(second),
            disp
        );
    }
    let _ = write!(out, "{:08x}", data.len());
    out
}
