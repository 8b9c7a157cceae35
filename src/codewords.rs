//! Codeword construction: segment packing, padding, per-block
//! Reed-Solomon encoding and block interleaving.

use crate::bits::BitBuffer;
use crate::error::{QrError, Result};
use crate::gf256::{gexp, Polynomial};
use crate::segments::Segment;
use crate::tables::{self, RsBlock};
use crate::types::{ErrorLevel, Version};

/// Alternating pad codewords appended after the terminator.
const PAD_BYTES: [u8; 2] = [0xEC, 0x11];

/// Bits required to encode the segments at a version, headers included.
pub fn encoded_bit_len(version: Version, segments: &[Segment]) -> Result<usize> {
    let mut bits = 0;
    for segment in segments {
        bits += 4 + tables::char_count_bits(segment.mode(), version)? + segment.bit_len();
    }
    Ok(bits)
}

/// Build the interleaved codeword stream for a (version, level, segments)
/// triple. The result is `total_codewords(version)` bytes: interleaved data
/// codewords followed by interleaved EC codewords.
pub fn build_codewords(
    version: Version,
    level: ErrorLevel,
    segments: &[Segment],
) -> Result<Vec<u8>> {
    let blocks = tables::rs_blocks(version, level);
    let data_total: usize = blocks.iter().map(|b| b.data_count).sum();
    let capacity_bits = 8 * data_total;

    let mut buf = BitBuffer::new();
    for segment in segments {
        buf.put(segment.mode().indicator(), 4);
        let count_width = tables::char_count_bits(segment.mode(), version)?;
        buf.put(segment.char_count() as u32, count_width);
        segment.write_bits(&mut buf)?;
    }

    if buf.len_in_bits() > capacity_bits {
        return Err(QrError::CodeOverflow {
            bits: buf.len_in_bits(),
            capacity: capacity_bits,
        });
    }

    // Terminator, if there is room for it.
    if buf.len_in_bits() + 4 <= capacity_bits {
        buf.put(0, 4);
    }
    // Zero-fill to the next codeword boundary.
    while buf.len_in_bits() % 8 != 0 {
        buf.put_bit(false);
    }
    // Alternating pad codewords up to the full data capacity.
    let mut pad_index = 0;
    while buf.len_in_bits() < capacity_bits {
        buf.put(PAD_BYTES[pad_index % 2] as u32, 8);
        pad_index += 1;
    }

    rs_encode_and_interleave(&buf.bytes()[..data_total], &blocks)
}

/// Generator polynomial for `ec_count` EC codewords:
/// the product of `(x - alpha^i)` for i in 0..ec_count.
pub fn generator_polynomial(ec_count: usize) -> Polynomial {
    let mut generator = Polynomial::new(&[1], 0);
    for i in 0..ec_count {
        generator = generator.multiply(&Polynomial::new(&[1, gexp(i as i32)], 0));
    }
    generator
}

/// Reed-Solomon EC codewords for one data block.
fn rs_remainder(data: &[u8], generator: &Polynomial, ec_count: usize) -> Vec<u8> {
    let remainder = Polynomial::new(data, ec_count).rem(generator);
    // The remainder may be shorter than ec_count when its leading
    // coefficients are zero; left-pad to the fixed width.
    let mut ec = vec![0u8; ec_count];
    let skip = ec_count - remainder.len().min(ec_count);
    for i in skip..ec_count {
        ec[i] = remainder.get(i - skip);
    }
    ec
}

/// Split `data` into blocks, RS-encode each, and interleave: the i-th data
/// codeword of every block in block order, then the i-th EC codeword of
/// every block, skipping blocks that ran out.
fn rs_encode_and_interleave(data: &[u8], blocks: &[RsBlock]) -> Result<Vec<u8>> {
    let ec_count = blocks
        .first()
        .map(|b| b.total_count - b.data_count)
        .ok_or_else(|| QrError::internal("empty RS block table"))?;
    let generator = generator_polynomial(ec_count);

    let mut data_blocks: Vec<&[u8]> = Vec::with_capacity(blocks.len());
    let mut ec_blocks: Vec<Vec<u8>> = Vec::with_capacity(blocks.len());
    let mut offset = 0;
    for block in blocks {
        let chunk = &data[offset..offset + block.data_count];
        offset += block.data_count;
        ec_blocks.push(rs_remainder(chunk, &generator, ec_count));
        data_blocks.push(chunk);
    }

    let total: usize = blocks.iter().map(|b| b.total_count).sum();
    let max_data = blocks.iter().map(|b| b.data_count).max().unwrap_or(0);

    let mut out = Vec::with_capacity(total);
    for i in 0..max_data {
        for block in &data_blocks {
            if let Some(&byte) = block.get(i) {
                out.push(byte);
            }
        }
    }
    for i in 0..ec_count {
        for block in &ec_blocks {
            out.push(block[i]);
        }
    }
    debug_assert_eq!(out.len(), total);
    Ok(out)
}
