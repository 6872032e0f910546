use crate::MacAddr;
use std::convert::{TryFrom, TryInto};
use std::net::Ipv4Addr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MareOp {
    Request = 1,
    Reply = 2,
}

impl TryFrom<u16> for MareOp {
    type Error = &'static str;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(MareOp::Request),
            2 => Ok(MareOp::Reply),
            _ => Err("Unknown MARE opcode"),
        }
    }
}

const OPCODE_RANGE: (usize, usize) = (0, 2);
const SENDER_IP_RANGE: (usize, usize) = (2, 6);
const SENDER_MAC_RANGE: (usize, usize) = (6, 12);
const TARGET_IP_RANGE: (usize, usize) = (12, 16);
const TARGET_MAC_RANGE: (usize, usize) = (16, 22);

/// Size of a serialized MARE message.
pub const MARE_LEN: usize = 22;

///
/// Address resolution message, carried as the payload of an EponaFrame whose protocol number is
/// MARE_PROTONUM. Requests leave the target hardware address unset; replies fill it in with the
/// hardware address of the host that asked.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MareFrame {
    pub op: MareOp,
    pub sender_ip: Ipv4Addr,
    pub sender_mac: MacAddr,
    pub target_ip: Ipv4Addr,
    pub target_mac: MacAddr,
}

impl MareFrame {
    pub fn request(sender_ip: Ipv4Addr, sender_mac: MacAddr, target_ip: Ipv4Addr) -> Self {
        MareFrame {
            op: MareOp::Request,
            sender_ip,
            sender_mac,
            target_ip,
            target_mac: MacAddr::UNSET,
        }
    }

    pub fn reply(
        sender_ip: Ipv4Addr,
        sender_mac: MacAddr,
        target_ip: Ipv4Addr,
        target_mac: MacAddr,
    ) -> Self {
        MareFrame {
            op: MareOp::Reply,
            sender_ip,
            sender_mac,
            target_ip,
            target_mac,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0; MARE_LEN];
        put(&mut data, OPCODE_RANGE, &(self.op as u16).to_be_bytes());
        put(&mut data, SENDER_IP_RANGE, &self.sender_ip.octets());
        put(&mut data, SENDER_MAC_RANGE, &self.sender_mac.bytes);
        put(&mut data, TARGET_IP_RANGE, &self.target_ip.octets());
        put(&mut data, TARGET_MAC_RANGE, &self.target_mac.bytes);
        data
    }
}

fn put(data: &mut [u8], (start, end): (usize, usize), bytes: &[u8]) {
    data[start..end].copy_from_slice(bytes);
}

fn ipv4_at(data: &[u8], (start, end): (usize, usize)) -> Ipv4Addr {
    let octets: [u8; 4] = data[start..end].try_into().unwrap();
    Ipv4Addr::from(octets)
}

fn mac_at(data: &[u8], (start, end): (usize, usize)) -> MacAddr {
    let bytes: [u8; 6] = data[start..end].try_into().unwrap();
    MacAddr::new(bytes)
}

impl TryFrom<&[u8]> for MareFrame {
    type Error = &'static str;

    ///
    /// Parses a MARE message out of a frame payload.
    /// Validates
    /// - The payload is exactly the size of a MARE message
    /// - The opcode is a request or a reply
    ///
    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        if data.len() != MARE_LEN {
            return Err("Payload is not the size of a MARE message");
        }

        let (start, end) = OPCODE_RANGE;
        let op = MareOp::try_from(u16::from_be_bytes(data[start..end].try_into().unwrap()))?;

        Ok(MareFrame {
            op,
            sender_ip: ipv4_at(data, SENDER_IP_RANGE),
            sender_mac: mac_at(data, SENDER_MAC_RANGE),
            target_ip: ipv4_at(data, TARGET_IP_RANGE),
            target_mac: mac_at(data, TARGET_MAC_RANGE),
        })
    }
}
