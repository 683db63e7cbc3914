//! Common Utilities
//!
//! Bit packing for allocation bitmaps and resource block group sizing

use bytes::{Bytes, BytesMut, BufMut};
use tracing::trace;

/// Convert a byte slice to hex string for debugging
pub fn bytes_to_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pack bits into bytes (MSB first)
pub fn pack_bits(bits: &[bool]) -> Bytes {
    let mut bytes = BytesMut::with_capacity((bits.len() + 7) / 8);

    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            if bit {
                byte |= 1 << (7 - i);
            }
        }
        bytes.put_u8(byte);
    }

    bytes.freeze()
}

/// Resource block group size for type 0 allocation (TS 36.213 Table 7.1.6.1-1)
pub fn rbg_size(num_rbs: u16) -> u16 {
    match num_rbs {
        0..=10 => 1,
        11..=26 => 2,
        27..=63 => 3,
        _ => 4,
    }
}

/// Number of resource block groups covering a bandwidth of `num_rbs`
pub fn num_rbgs(num_rbs: u16) -> u16 {
    let size = rbg_size(num_rbs);
    let rbgs = num_rbs.div_ceil(size);

    trace!("Calculated {} RBGs of size {} for {} RBs", rbgs, size, num_rbs);

    rbgs
}
