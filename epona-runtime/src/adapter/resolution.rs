use crossbeam::channel::{self, Receiver, Sender};
use epona_packets::MacAddr;
use std::time::Duration;

/// How long to wait for a reply before asking again.
pub const MARE_TIMEOUT: Duration = Duration::from_millis(100);

/// Requests sent after the first one before giving up, for three attempts in all.
pub const MARE_MAX_RETRIES: u8 = 2;

/// How a pending resolution ended, as seen by each caller blocked on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Resolved(MacAddr),
    Failed,
}

pub(crate) struct QueuedDatagram {
    pub protonum: u16,
    pub dgram: Vec<u8>,
}

/// Resolution in flight for one next-hop address.
///
/// Every caller that ran into it holds the receiving end of a one-shot channel and blocks on it.
/// Whoever ends the resolution (the reply handler on success, the caller that created the entry
/// on the final timeout) takes the whole entry out of the pending table and settles it.
pub(crate) struct PendingResolution {
    retries: u8,
    queue: Vec<QueuedDatagram>,
    waiters: Vec<Sender<Outcome>>,
}

impl PendingResolution {
    pub fn new() -> Self {
        PendingResolution {
            retries: 0,
            queue: vec![],
            waiters: vec![],
        }
    }

    /// Queues a datagram behind this resolution and returns where its caller learns the outcome.
    pub fn enqueue(&mut self, protonum: u16, dgram: &[u8]) -> Receiver<Outcome> {
        let (sender, receiver) = channel::bounded(1);
        self.queue.push(QueuedDatagram {
            protonum,
            dgram: dgram.to_vec(),
        });
        self.waiters.push(sender);
        receiver
    }

    /// Counts another attempt. Returns false once every attempt has been used.
    pub fn retry(&mut self) -> bool {
        if self.retries < MARE_MAX_RETRIES {
            self.retries += 1;
            true
        } else {
            false
        }
    }

    pub fn attempts(&self) -> u8 {
        self.retries + 1
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Hands back the queued datagrams; they must be sent before `settle` wakes their callers.
    pub fn take_queue(&mut self) -> Vec<QueuedDatagram> {
        std::mem::take(&mut self.queue)
    }

    pub fn settle(self, outcome: Outcome) {
        for waiter in self.waiters {
            // One send per waiter into capacity one; a waiter that hung up is skipped.
            let _ = waiter.try_send(outcome);
        }
    }
}
