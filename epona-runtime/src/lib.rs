extern crate crossbeam;

/// The physical layer the EPONA core runs over. Nodes (adapters, switch ports) attach to links, and
/// a link hands every frame transmitted on it to every other attached node. The simulated medium
/// can be told to corrupt the next frame so that integrity checking can be exercised. Nothing here
/// knows about EPONA framing; links carry opaque bytes.
pub mod phy;

/// Host-side network interfaces. An adapter frames datagrams handed down by the network layer,
/// filters and delivers frames coming up from its link, and resolves next-hop IPv4 addresses to
/// hardware addresses with MARE before sending by IP.
pub mod adapter;

/// Self-learning layer-2 forwarding between the ports of a switch.
pub mod switch;

/// Multiport node that repeats every frame out of every other port, with no validation or learning.
pub mod repeater;

mod error;
pub use self::error::*;

/// Utility module
pub mod utils;
