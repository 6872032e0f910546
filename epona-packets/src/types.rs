use std::convert::TryFrom;
use std::fmt;

pub type PacketData = Vec<u8>;

/// Protocol number reserved for MARE address resolution traffic.
pub const MARE_PROTONUM: u16 = 0x0806;

/// Protocol number conventionally used for IPv4 datagrams.
pub const IPV4_PROTONUM: u16 = 0x0800;

//Most significant byte is 0th
#[derive(Eq, Clone, Copy, Hash, PartialEq, Default)]
pub struct MacAddr {
    pub bytes: [u8; 6],
}

impl MacAddr {
    /// All-ones address, accepted by every adapter.
    pub const BROADCAST: MacAddr = MacAddr { bytes: [0xff; 6] };

    /// Placeholder carried in the target field of unanswered MARE requests.
    pub const UNSET: MacAddr = MacAddr { bytes: [0; 6] };

    pub fn new(bytes: [u8; 6]) -> MacAddr {
        MacAddr { bytes }
    }

    pub fn is_broadcast(&self) -> bool {
        *self == MacAddr::BROADCAST
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr::new(bytes)
    }
}

impl TryFrom<&[u8]> for MacAddr {
    type Error = &'static str;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 6 {
            return Err("Hardware address must be exactly 6 bytes");
        }
        let mut mac = [0; 6];
        mac.copy_from_slice(bytes);
        Ok(MacAddr::new(mac))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({})", self)
    }
}
