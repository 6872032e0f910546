//! Integrity check for EPONA frames.
//!
//! CRC-32 as used by IEEE 802.3 (reflected polynomial 0xEDB88320, initial value and final XOR
//! of all ones). It catches every single-bit error and every burst error up to 32 bits long,
//! which is what the simulated medium produces.

const CRC32_POLY: u32 = 0xEDB8_8320;

const CRC32_TABLE: [u32; 256] = crc32_table();

const fn crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { CRC32_POLY ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// Running CRC-32 state, so the check can be fed the header and payload separately without
/// stitching them into one buffer.
#[derive(Clone, Copy, Debug)]
pub struct Crc32 {
    state: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Crc32::new()
    }
}

impl Crc32 {
    pub fn new() -> Self {
        Crc32 { state: !0 }
    }

    pub fn update(mut self, data: &[u8]) -> Self {
        for &byte in data {
            let idx = ((self.state ^ byte as u32) & 0xff) as usize;
            self.state = CRC32_TABLE[idx] ^ (self.state >> 8);
        }
        self
    }

    pub fn finish(self) -> u32 {
        !self.state
    }
}

/// CRC-32 of a single contiguous buffer.
pub fn crc32(data: &[u8]) -> u32 {
    Crc32::new().update(data).finish()
}
