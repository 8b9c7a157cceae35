//! Version- and level-dependent tables: Reed-Solomon block layout,
//! alignment pattern centers, and character-count field widths.

use crate::error::{QrError, Result};
use crate::types::{EncodeMode, ErrorLevel, Version};

/// Total codewords (data + error correction) per version.
const TOTAL_CODEWORDS: [usize; 40] = [
    26, 44, 70, 100, 134, 172, 196, 242, 292, 346, // 1-10
    404, 466, 532, 581, 655, 733, 815, 901, 991, 1085, // 11-20
    1156, 1258, 1364, 1474, 1588, 1706, 1828, 1921, 2051, 2185, // 21-30
    2323, 2465, 2611, 2761, 2876, 3034, 3196, 3362, 3532, 3706, // 31-40
];

/// Error correction parameters as (block count, EC codewords per block),
/// indexed `[version - 1][level]` with level order L, M, Q, H.
///
/// Together with `TOTAL_CODEWORDS` this encodes the full standard block
/// table: the per-block data counts follow from the division below.
const EC_PARAMS: [[(usize, usize); 4]; 40] = [
    [(1, 7), (1, 10), (1, 13), (1, 17)],
    [(1, 10), (1, 16), (1, 22), (1, 28)],
    [(1, 15), (1, 26), (2, 18), (2, 22)],
    [(1, 20), (2, 18), (2, 26), (4, 16)],
    [(1, 26), (2, 24), (4, 18), (4, 22)],
    [(2, 18), (4, 16), (4, 24), (4, 28)],
    [(2, 20), (4, 18), (6, 18), (5, 26)],
    [(2, 24), (4, 22), (6, 22), (6, 26)],
    [(2, 30), (5, 22), (8, 20), (8, 24)],
    [(4, 18), (5, 26), (8, 24), (8, 28)],
    [(4, 20), (5, 30), (8, 28), (11, 24)],
    [(4, 24), (8, 22), (10, 26), (11, 28)],
    [(4, 26), (9, 22), (12, 24), (16, 22)],
    [(4, 30), (9, 24), (16, 20), (16, 24)],
    [(6, 22), (10, 24), (12, 30), (18, 24)],
    [(6, 24), (10, 28), (17, 24), (16, 30)],
    [(6, 28), (11, 28), (16, 28), (19, 28)],
    [(6, 30), (13, 26), (18, 28), (21, 28)],
    [(7, 28), (14, 26), (21, 26), (25, 26)],
    [(8, 28), (16, 26), (20, 30), (25, 28)],
    [(8, 28), (17, 26), (23, 28), (25, 30)],
    [(9, 28), (17, 28), (23, 30), (34, 24)],
    [(9, 30), (18, 28), (25, 30), (30, 30)],
    [(10, 30), (20, 28), (27, 30), (32, 30)],
    [(12, 26), (21, 28), (29, 30), (35, 30)],
    [(12, 28), (23, 28), (34, 28), (37, 30)],
    [(12, 30), (25, 28), (34, 30), (40, 30)],
    [(13, 30), (26, 28), (35, 30), (42, 30)],
    [(14, 30), (28, 28), (38, 30), (45, 30)],
    [(15, 30), (29, 28), (40, 30), (48, 30)],
    [(16, 30), (31, 28), (43, 30), (51, 30)],
    [(17, 30), (33, 28), (45, 30), (54, 30)],
    [(18, 30), (35, 28), (48, 30), (57, 30)],
    [(19, 30), (37, 28), (51, 30), (60, 30)],
    [(19, 30), (38, 28), (53, 30), (63, 30)],
    [(20, 30), (40, 28), (56, 30), (66, 30)],
    [(21, 30), (43, 28), (59, 30), (70, 30)],
    [(22, 30), (45, 28), (62, 30), (74, 30)],
    [(24, 30), (47, 28), (65, 30), (77, 30)],
    [(25, 30), (49, 28), (68, 30), (81, 30)],
];

/// Alignment pattern center coordinates per version (version 1 has none).
const ALIGNMENT_POSITIONS: [&[usize]; 40] = [
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

/// One Reed-Solomon block: total codewords and the data codewords within.
///
/// `total_count - data_count` is the EC codeword count, identical for every
/// block of a given (version, level).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsBlock {
    pub total_count: usize,
    pub data_count: usize,
}

/// The RS block sequence for a (version, level) combination.
///
/// Blocks with one fewer data codeword come first, the longer blocks last,
/// reproducing the ordering of the standard's table.
pub fn rs_blocks(version: Version, level: ErrorLevel) -> Vec<RsBlock> {
    let idx = version.number() as usize - 1;
    let (block_count, ec_per_block) = EC_PARAMS[idx][level.table_index()];
    let data_total = TOTAL_CODEWORDS[idx] - block_count * ec_per_block;

    let short_data = data_total / block_count;
    let long_blocks = data_total % block_count;

    let mut blocks = Vec::with_capacity(block_count);
    for i in 0..block_count {
        let data_count = if i >= block_count - long_blocks {
            short_data + 1
        } else {
            short_data
        };
        blocks.push(RsBlock {
            total_count: data_count + ec_per_block,
            data_count,
        });
    }
    blocks
}

/// Total codeword capacity (data + EC) of a version.
pub fn total_codewords(version: Version) -> usize {
    TOTAL_CODEWORDS[version.number() as usize - 1]
}

/// Payload capacity in data codewords for a (version, level) combination.
pub fn data_codewords(version: Version, level: ErrorLevel) -> usize {
    let idx = version.number() as usize - 1;
    let (block_count, ec_per_block) = EC_PARAMS[idx][level.table_index()];
    TOTAL_CODEWORDS[idx] - block_count * ec_per_block
}

/// Alignment pattern row/column centers for a version.
pub fn alignment_positions(version: Version) -> &'static [usize] {
    ALIGNMENT_POSITIONS[version.number() as usize - 1]
}

/// Width of the character-count field for a mode at a version.
pub fn char_count_bits(mode: EncodeMode, version: Version) -> Result<usize> {
    let band = match version.number() {
        1..=9 => 0,
        10..=26 => 1,
        27..=40 => 2,
        n => {
            return Err(QrError::internal(format!(
                "no character count width for version {n}"
            )))
        }
    };
    Ok(match mode {
        EncodeMode::Numeric => [10, 12, 14][band],
        EncodeMode::Alphanumeric => [9, 11, 13][band],
        EncodeMode::Byte => [8, 16, 16][band],
        EncodeMode::Kanji => [8, 10, 12][band],
    })
}
