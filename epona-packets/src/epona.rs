use crate::*;
use std::borrow::Cow;
use std::convert::{TryFrom, TryInto};

// 0                  6                  12           14            18
// |--6 byte Dest_MAC-|--6 byte Src_MAC--|--Protonum--|--CRC-32-----|--payload...
const DEST_MAC_RANGE: (usize, usize) = (0, 6);
const SRC_MAC_RANGE: (usize, usize) = (6, 12);
const PROTONUM_RANGE: (usize, usize) = (12, 14);
const CHECKSUM_RANGE: (usize, usize) = (14, 18);

/// Length of everything in front of the payload, integrity check included.
pub const EPONA_HEADER_LEN: usize = 18;

#[derive(Clone, Debug)]
pub struct EponaFrame {
    pub data: PacketData,
}

impl EponaFrame {
    /// Builds a frame with a freshly computed integrity check.
    pub fn new(dest: MacAddr, src: MacAddr, protonum: u16, payload: &[u8]) -> EponaFrame {
        let mut data = Vec::with_capacity(EPONA_HEADER_LEN + payload.len());
        data.extend_from_slice(&dest.bytes);
        data.extend_from_slice(&src.bytes);
        data.extend_from_slice(&protonum.to_be_bytes());
        data.extend_from_slice(&[0; 4]);
        data.extend_from_slice(payload);

        let mut frame = EponaFrame { data };
        frame.update_checksum();
        frame
    }

    /// Wraps raw bytes without verifying the integrity check. Only the length is validated.
    pub fn from_buffer(data: PacketData) -> Result<EponaFrame, &'static str> {
        if data.len() < EPONA_HEADER_LEN {
            return Err("Frame is less than the minimum of 18 bytes");
        }

        Ok(EponaFrame { data })
    }

    /// Parses received bytes, rejecting anything whose integrity check does not match.
    pub fn decode(data: &[u8]) -> Result<EponaFrame, &'static str> {
        let frame = EponaFrame::from_buffer(data.to_vec())?;
        if !frame.is_valid() {
            return Err("Frame integrity check failed");
        }
        Ok(frame)
    }

    pub fn dest_mac(&self) -> MacAddr {
        let (start, end) = DEST_MAC_RANGE;
        let bytes = <[u8; 6]>::try_from(&self.data[start..end]).unwrap();
        MacAddr::new(bytes)
    }

    pub fn src_mac(&self) -> MacAddr {
        let (start, end) = SRC_MAC_RANGE;
        let bytes = <[u8; 6]>::try_from(&self.data[start..end]).unwrap();
        MacAddr::new(bytes)
    }

    pub fn set_dest_mac(&mut self, mac: MacAddr) {
        let (start, end) = DEST_MAC_RANGE;
        self.data[start..end].copy_from_slice(&mac.bytes);
    }

    pub fn set_src_mac(&mut self, mac: MacAddr) {
        let (start, end) = SRC_MAC_RANGE;
        self.data[start..end].copy_from_slice(&mac.bytes);
    }

    pub fn protonum(&self) -> u16 {
        let (start, end) = PROTONUM_RANGE;
        u16::from_be_bytes(self.data[start..end].try_into().unwrap())
    }

    pub fn set_protonum(&mut self, protonum: u16) {
        let (start, end) = PROTONUM_RANGE;
        self.data[start..end].copy_from_slice(&protonum.to_be_bytes());
    }

    /// The integrity check carried in the frame.
    pub fn checksum(&self) -> u32 {
        let (start, end) = CHECKSUM_RANGE;
        u32::from_be_bytes(self.data[start..end].try_into().unwrap())
    }

    /// The integrity check the frame's current contents should carry.
    pub fn compute_checksum(&self) -> u32 {
        let (start, end) = CHECKSUM_RANGE;
        Crc32::new()
            .update(&self.data[..start])
            .update(&self.data[end..])
            .finish()
    }

    /// Recomputes the integrity check; setters leave it stale until this is called.
    pub fn update_checksum(&mut self) {
        let (start, end) = CHECKSUM_RANGE;
        let checksum = self.compute_checksum();
        self.data[start..end].copy_from_slice(&checksum.to_be_bytes());
    }

    pub fn is_valid(&self) -> bool {
        self.checksum() == self.compute_checksum()
    }

    /// Everything after the header, borrowed from the frame.
    pub fn payload(&self) -> Cow<[u8]> {
        Cow::from(&self.data[EPONA_HEADER_LEN..])
    }

    pub fn set_payload(&mut self, payload: &[u8]) {
        self.data.truncate(EPONA_HEADER_LEN);
        self.data.reserve_exact(payload.len());
        self.data.extend(payload);
    }

    pub fn into_bytes(self) -> PacketData {
        self.data
    }
}

impl PartialEq for EponaFrame {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for EponaFrame {}
