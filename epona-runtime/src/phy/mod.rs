//! # What is it for?
//!
//! The EPONA core never touches bits on a wire. Adapters and switch ports are `Node`s; they hand
//! encoded frames to a `Link`, and the link hands them to every other node attached to it. The
//! only link provided is `BroadcastLink`, a shared segment that delivers synchronously, in order,
//! and can be told to flip a bit in the next frame it carries.
//!
//! Links only hold nodes weakly. A node that is dropped stops receiving frames without having to
//! detach itself first.

use crate::EponaError;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Weak;

mod broadcast_link;
pub use self::broadcast_link::*;

mod ports;
pub use self::ports::*;

/// Identifies a node on the links it is attached to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(usize);

impl NodeId {
    /// Hands out a process-wide unique id.
    pub fn next() -> NodeId {
        static NEXT_ID: AtomicUsize = AtomicUsize::new(1);
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Anything that can sit on a link and receive frames from it.
pub trait Node: Send + Sync {
    fn rx_link(&self, frame: &[u8]);
}

pub trait Link: Send + Sync {
    fn name(&self) -> &str;

    fn attach(&self, id: NodeId, node: Weak<dyn Node>);

    fn detach(&self, id: NodeId);

    /// Delivers `frame` to every attached node other than `sender`.
    /// Fails if `sender` is not attached to this link.
    fn tx(&self, sender: NodeId, frame: &[u8]) -> Result<(), EponaError>;
}
