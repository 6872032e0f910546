//! # What is it for?
//!
//! An `Adapter` is a host's interface onto an EPONA link. Going down, the network layer either
//! names the destination hardware address itself (`output`) or hands over an IPv4 address and
//! lets the adapter work out the next hop and resolve it (`output_ip`). Coming up, every frame the
//! link delivers goes through `rx`, which drops anything corrupted or not meant for us, answers
//! and learns from MARE traffic, and passes everything else to the network layer's `Input`.
//!
//! Resolution state lives behind one lock per adapter: the table of learned translations and the
//! resolutions still in flight. The lock is never held while a frame is on the wire, because a
//! transmission can come straight back into this adapter (the reply to a request may arrive before
//! `tx` of the request returns).

use crate::phy::{Link, Node, NodeId};
use crate::utils::lock;
use crate::EponaError;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use epona_packets::{EponaFrame, MacAddr, MareFrame, MareOp, MARE_PROTONUM};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, instrument, trace, warn};

mod config;
pub use self::config::*;

mod mare_table;
use self::mare_table::MareTable;

mod resolution;
use self::resolution::{Outcome, PendingResolution};
pub use self::resolution::{MARE_MAX_RETRIES, MARE_TIMEOUT};

/// The network layer, as seen from below: where accepted datagrams are delivered.
pub trait Input: Send + Sync {
    fn input(&self, protonum: u16, dgram: Vec<u8>);
}

impl<F> Input for F
where
    F: Fn(u16, Vec<u8>) + Send + Sync,
{
    fn input(&self, protonum: u16, dgram: Vec<u8>) {
        self(protonum, dgram)
    }
}

/// Network layer that throws away everything delivered to it.
pub struct Discard;

impl Input for Discard {
    fn input(&self, _protonum: u16, _dgram: Vec<u8>) {}
}

struct MareState {
    table: MareTable,
    pending: HashMap<Ipv4Addr, PendingResolution>,
}

/// What the caller driving a resolution does after a timeout.
enum Retry {
    Resend,
    Exhausted(PendingResolution),
    // A reply got there first.
    Settled,
}

pub struct Adapter {
    id: NodeId,
    config: AdapterConfig,
    input: Box<dyn Input>,
    link: Mutex<Option<Arc<dyn Link>>>,
    mare: Mutex<MareState>,
}

impl Adapter {
    pub fn new<I: Input + 'static>(config: AdapterConfig, input: I) -> Arc<Adapter> {
        Arc::new(Adapter {
            id: NodeId::next(),
            config,
            input: Box::new(input),
            link: Mutex::new(None),
            mare: Mutex::new(MareState {
                table: MareTable::new(),
                pending: HashMap::new(),
            }),
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn hwaddr(&self) -> MacAddr {
        self.config.hwaddr()
    }

    /// Attaches to `link`, leaving whatever link we were attached to before.
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

    /// Hardware address currently cached for `addr`, if any.
    pub fn cached(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        lock(&self.mare).table.get(&addr)
    }

    /// Number of next hops with a resolution in flight.
    pub fn pending_count(&self) -> usize {
        lock(&self.mare).pending.len()
    }

    /// Number of datagrams waiting on the resolution of `next_hop`.
    pub fn queued(&self, next_hop: Ipv4Addr) -> usize {
        lock(&self.mare)
            .pending
            .get(&next_hop)
            .map_or(0, |pending| pending.queued())
    }

    fn tx(&self, frame: &[u8]) {
        let link = lock(&self.link).clone();
        match link {
            Some(link) => {
                if let Err(err) = link.tx(self.id, frame) {
                    warn!(adapter = %self.hwaddr(), %err, "transmit failed");
                }
            }
            None => trace!(adapter = %self.hwaddr(), "not plugged in, frame dropped"),
        }
    }

    /// Sends `dgram` to the adapter with hardware address `dst` (or to everyone, for broadcast).
    pub fn output(&self, protonum: u16, dst: MacAddr, dgram: &[u8]) {
        let frame = EponaFrame::new(dst, self.hwaddr(), protonum, dgram);
        self.tx(&frame.data);
    }

    /// Handles a frame delivered by the link.
    pub fn rx(&self, frame: &[u8]) {
        let frame = match EponaFrame::decode(frame) {
            Ok(frame) => frame,
            Err(reason) => {
                trace!(adapter = %self.hwaddr(), reason, "frame dropped");
                return;
            }
        };

        let dest = frame.dest_mac();
        if dest != self.hwaddr() && !dest.is_broadcast() {
            trace!(adapter = %self.hwaddr(), %dest, "frame not for us");
            return;
        }

        if frame.protonum() == MARE_PROTONUM {
            self.handle_mare(&frame.payload());
        } else {
            self.input
                .input(frame.protonum(), frame.payload().into_owned());
        }
    }

    fn handle_mare(&self, payload: &[u8]) {
        let message = match MareFrame::try_from(payload) {
            Ok(message) => message,
            Err(reason) => {
                trace!(adapter = %self.hwaddr(), reason, "MARE message dropped");
                return;
            }
        };

        let resolved = {
            let mut state = lock(&self.mare);
            state.table.insert(message.sender_ip, message.sender_mac);
            match message.op {
                MareOp::Reply => state.pending.remove(&message.sender_ip),
                MareOp::Request => None,
            }
        };

        match message.op {
            MareOp::Request if message.target_ip == self.config.ip() => {
                trace!(adapter = %self.hwaddr(), requester = %message.sender_ip, "answering MARE request");
                let reply = MareFrame::reply(
                    self.config.ip(),
                    self.hwaddr(),
                    message.sender_ip,
                    message.sender_mac,
                );
                self.output(MARE_PROTONUM, message.sender_mac, &reply.to_bytes());
            }
            MareOp::Reply => {
                if let Some(pending) = resolved {
                    debug!(
                        adapter = %self.hwaddr(),
                        next_hop = %message.sender_ip,
                        mac = %message.sender_mac,
                        "resolved"
                    );
                    self.flush(pending, message.sender_mac);
                }
            }
            MareOp::Request => {}
        }
    }

    fn flush(&self, mut pending: PendingResolution, mac: MacAddr) {
        for queued in pending.take_queue() {
            self.output(queued.protonum, mac, &queued.dgram);
        }
        pending.settle(Outcome::Resolved(mac));
    }

    fn send_request(&self, target: Ipv4Addr) {
        let request = MareFrame::request(self.config.ip(), self.hwaddr(), target);
        self.output(MARE_PROTONUM, MacAddr::BROADCAST, &request.to_bytes());
    }

    ///
    /// Sends `dgram` towards the IPv4 address `addr`, framed for the next hop: `addr` itself when
    /// it is on our subnet, the gateway otherwise.
    ///
    /// If the next hop's hardware address is not cached yet, this broadcasts a MARE request for it
    /// and blocks until a reply arrives. Callers that need the same next hop while the request is
    /// out queue up behind it instead of asking again. A request goes unanswered for
    /// `MARE_TIMEOUT` before it is repeated; after `MARE_MAX_RETRIES` repeats the resolution fails,
    /// every datagram queued behind it is dropped and every caller waiting on it gets
    /// `NoRouteToHost`.
    ///
    /// Queued datagrams go out in the order they were queued, before any of their callers
    /// returns. Ordering against new callers is not kept: once the reply is in, a call for the
    /// same next hop finds the address cached and may reach the link while the queue is still
    /// being flushed.
    ///
    #[instrument(level = "debug", skip(self, dgram))]
    pub fn output_ip(&self, protonum: u16, addr: Ipv4Addr, dgram: &[u8]) -> Result<(), EponaError> {
        let next_hop = self.config.next_hop(addr);

        let (outcome, drives_timer) = {
            let mut state = lock(&self.mare);
            if let Some(mac) = state.table.get(&next_hop) {
                drop(state);
                self.output(protonum, mac, dgram);
                return Ok(());
            }
            match state.pending.entry(next_hop) {
                Entry::Occupied(mut entry) => (entry.get_mut().enqueue(protonum, dgram), false),
                Entry::Vacant(entry) => (
                    entry
                        .insert(PendingResolution::new())
                        .enqueue(protonum, dgram),
                    true,
                ),
            }
        };

        if !drives_timer {
            trace!(%next_hop, "queued behind resolution in flight");
            return finish(outcome.recv().ok(), next_hop);
        }

        debug!(adapter = %self.hwaddr(), %next_hop, "resolving");
        self.send_request(next_hop);
        self.await_resolution(outcome, next_hop)
    }

    fn await_resolution(
        &self,
        outcome: Receiver<Outcome>,
        next_hop: Ipv4Addr,
    ) -> Result<(), EponaError> {
        loop {
            match outcome.recv_timeout(MARE_TIMEOUT) {
                Ok(outcome) => return finish(Some(outcome), next_hop),
                Err(RecvTimeoutError::Disconnected) => return finish(None, next_hop),
                Err(RecvTimeoutError::Timeout) => match self.on_timeout(next_hop) {
                    Retry::Resend => self.send_request(next_hop),
                    Retry::Exhausted(pending) => {
                        warn!(
                            adapter = %self.hwaddr(),
                            %next_hop,
                            attempts = pending.attempts(),
                            dropped = pending.queued(),
                            "no reply to MARE request, giving up"
                        );
                        // Our own receiver is among the waiters; the next pass picks it up.
                        pending.settle(Outcome::Failed);
                    }
                    Retry::Settled => return finish(outcome.recv().ok(), next_hop),
                },
            }
        }
    }

    fn on_timeout(&self, next_hop: Ipv4Addr) -> Retry {
        let mut state = lock(&self.mare);
        let retrying = match state.pending.get_mut(&next_hop) {
            Some(pending) => pending.retry(),
            None => return Retry::Settled,
        };
        if retrying {
            trace!(%next_hop, "MARE request timed out, asking again");
            Retry::Resend
        } else {
            state
                .pending
                .remove(&next_hop)
                .map_or(Retry::Settled, Retry::Exhausted)
        }
    }
}

fn finish(outcome: Option<Outcome>, next_hop: Ipv4Addr) -> Result<(), EponaError> {
    match outcome {
        Some(Outcome::Resolved(_)) => Ok(()),
        Some(Outcome::Failed) | None => Err(EponaError::NoRouteToHost(next_hop)),
    }
}

impl Node for Adapter {
    fn rx_link(&self, frame: &[u8]) {
        self.rx(frame);
    }
}

impl Drop for Adapter {
    fn drop(&mut self) {
        self.unplug();
    }
}
