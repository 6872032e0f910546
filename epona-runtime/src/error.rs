use failure::Fail;
use std::net::Ipv4Addr;

#[derive(Debug, Fail, Clone, PartialEq, Eq)]
pub enum EponaError {
    /// Address resolution for the next hop gave up after every attempt went unanswered.
    #[fail(display = "no route to host {}", _0)]
    NoRouteToHost(Ipv4Addr),

    #[fail(display = "invalid port number {} (node has {} ports)", port, nports)]
    InvalidPort { port: usize, nports: usize },

    #[fail(display = "link {:?} received a frame from an unattached node", _0)]
    UnattachedSender(String),
}
