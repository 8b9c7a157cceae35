//! Module grid construction: function patterns, format and version bits,
//! zig-zag data placement, and mask selection.
//!
//! The same build routine runs nine times per symbol: eight trial builds
//! (one per mask pattern, format and version cells forced light so they do
//! not bias the penalty) and one final build with the winning mask.

use log::debug;

use crate::penalty;
use crate::tables;
use crate::types::{ErrorLevel, MaskPattern, Version};

const G15: u32 = 0b10100110111;
const G15_MASK: u32 = 0b101010000010010;
const G18: u32 = 0b1111100100101;

/// Whether a build commits format/version bits or leaves them light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Trial,
    Final,
}

/// An N x N grid of tri-state modules. `None` marks a cell not yet
/// assigned; after a build completes every cell is `Some`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modules {
    n: usize,
    cells: Vec<Option<bool>>,
}

impl Modules {
    fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![None; n * n],
        }
    }

    /// Side length in modules.
    pub fn size(&self) -> usize {
        self.n
    }

    fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.cells[row * self.n + col]
    }

    fn set(&mut self, row: usize, col: usize, dark: bool) {
        self.cells[row * self.n + col] = Some(dark);
    }

    /// Darkness of a cell. Unassigned cells read as light; a completed
    /// build has none.
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        self.get(row, col).unwrap_or(false)
    }

    /// True once every cell has been assigned.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }
}

/// Build the grid for one (version, level, mask) combination over the
/// interleaved codeword stream.
pub fn build(
    version: Version,
    level: ErrorLevel,
    mask: MaskPattern,
    data: &[u8],
    mode: BuildMode,
) -> Modules {
    let mut grid = Modules::new(version.size());
    place_finders(&mut grid);
    place_alignment(&mut grid, version);
    place_timing(&mut grid);
    place_format(&mut grid, level, mask, mode);
    if version.number() >= 7 {
        place_version(&mut grid, version, mode);
    }
    place_data(&mut grid, data, mask);
    grid
}

/// Run all eight trial builds, score them, and commit the final build with
/// the lowest-penalty pattern (ties break to the lowest index).
pub fn choose_mask(
    version: Version,
    level: ErrorLevel,
    data: &[u8],
) -> (MaskPattern, Modules) {
    let mut best = (MaskPattern::Pattern0, u32::MAX);
    for pattern in MaskPattern::ALL {
        let trial = build(version, level, pattern, data, BuildMode::Trial);
        let score = penalty::score(trial.size(), |r, c| trial.is_dark(r, c));
        if score < best.1 {
            best = (pattern, score);
        }
    }
    let (pattern, score) = best;
    debug!(
        "mask pattern {} selected with penalty {score}",
        pattern.index()
    );
    (pattern, build(version, level, pattern, data, BuildMode::Final))
}

/// Stamp the three finder patterns and their separators. The stamp covers
/// a 9x9 area clipped to the grid, so the one-cell light border falls out
/// of the same loop.
fn place_finders(grid: &mut Modules) {
    let n = grid.size() as i32;
    for &(row, col) in &[(0, 0), (n - 7, 0), (0, n - 7)] {
        for r in -1..=7i32 {
            if row + r < 0 || row + r >= n {
                continue;
            }
            for c in -1..=7i32 {
                if col + c < 0 || col + c >= n {
                    continue;
                }
                let dark = ((0..=6).contains(&r) && (c == 0 || c == 6))
                    || ((0..=6).contains(&c) && (r == 0 || r == 6))
                    || ((2..=4).contains(&r) && (2..=4).contains(&c));
                grid.set((row + r) as usize, (col + c) as usize, dark);
            }
        }
    }
}

/// Stamp 5x5 alignment patterns at every centre whose cell is still
/// unassigned; centres inside the finder corners skip automatically.
fn place_alignment(grid: &mut Modules, version: Version) {
    let positions = tables::alignment_positions(version);
    for &row in positions {
        for &col in positions {
            if grid.get(row, col).is_some() {
                continue;
            }
            for r in -2..=2i32 {
                for c in -2..=2i32 {
                    let dark = r == -2 || r == 2 || c == -2 || c == 2 || (r == 0 && c == 0);
                    grid.set((row as i32 + r) as usize, (col as i32 + c) as usize, dark);
                }
            }
        }
    }
}

/// Alternating timing row and column, dark on even indices. Cells already
/// claimed by alignment patterns are left untouched.
fn place_timing(grid: &mut Modules) {
    let n = grid.size();
    for i in 8..n - 8 {
        if grid.get(6, i).is_none() {
            grid.set(6, i, i % 2 == 0);
        }
        if grid.get(i, 6).is_none() {
            grid.set(i, 6, i % 2 == 0);
        }
    }
}

/// Number of significant bits in `d`.
fn bch_digit(mut d: u32) -> u32 {
    let mut digit = 0;
    while d != 0 {
        digit += 1;
        d >>= 1;
    }
    digit
}

/// 15-bit BCH-protected format field for a (level, mask) pair.
fn bch_format(data: u32) -> u32 {
    let mut d = data << 10;
    while bch_digit(d) >= bch_digit(G15) {
        d ^= G15 << (bch_digit(d) - bch_digit(G15));
    }
    ((data << 10) | d) ^ G15_MASK
}

/// 18-bit BCH-protected version field.
fn bch_version(version: u32) -> u32 {
    let mut d = version << 12;
    while bch_digit(d) >= bch_digit(G18) {
        d ^= G18 << (bch_digit(d) - bch_digit(G18));
    }
    (version << 12) | d
}

/// Write the two redundant format-bit runs and the fixed dark module.
/// Trial builds force every one of these cells light.
fn place_format(grid: &mut Modules, level: ErrorLevel, mask: MaskPattern, mode: BuildMode) {
    let n = grid.size();
    let bits = bch_format((level.format_bits() << 3) | mask.index());
    for i in 0..15usize {
        let dark = mode == BuildMode::Final && (bits >> i) & 1 == 1;

        // Vertical run along column 8, skipping the timing row.
        let (row, col) = if i < 6 {
            (i, 8)
        } else if i < 8 {
            (i + 1, 8)
        } else {
            (n - 15 + i, 8)
        };
        grid.set(row, col, dark);

        // Horizontal run along row 8, skipping the timing column.
        let (row, col) = if i < 8 {
            (8, n - 1 - i)
        } else if i < 9 {
            (8, 15 - i)
        } else {
            (8, 14 - i)
        };
        grid.set(row, col, dark);
    }
    grid.set(n - 8, 8, mode == BuildMode::Final);
}

/// Write the two 3x6 version-bit blocks (versions 7 and up).
fn place_version(grid: &mut Modules, version: Version, mode: BuildMode) {
    let n = grid.size();
    let bits = bch_version(version.number() as u32);
    for i in 0..18usize {
        let dark = mode == BuildMode::Final && (bits >> i) & 1 == 1;
        grid.set(i / 3, i % 3 + n - 11, dark);
        grid.set(i % 3 + n - 11, i / 3, dark);
    }
}

/// Zig-zag the codeword bits into every unassigned cell, walking column
/// pairs right to left (column 6 skipped), snaking up and down. Each bit is
/// XOR'd with the mask predicate; bits beyond the stream read as 0.
fn place_data(grid: &mut Modules, data: &[u8], mask: MaskPattern) {
    let n = grid.size() as i32;
    let mut inc: i32 = -1;
    let mut row: i32 = n - 1;
    let mut byte_index = 0usize;
    let mut bit_index = 7i32;

    let mut col = n - 1;
    while col > 0 {
        if col == 6 {
            col -= 1;
        }
        loop {
            for c in 0..2 {
                let cc = (col - c) as usize;
                if grid.get(row as usize, cc).is_none() {
                    let mut dark = byte_index < data.len()
                        && (data[byte_index] >> bit_index) & 1 == 1;
                    if mask.is_masked(row as usize, cc) {
                        dark = !dark;
                    }
                    grid.set(row as usize, cc, dark);
                    bit_index -= 1;
                    if bit_index == -1 {
                        byte_index += 1;
                        bit_index = 7;
                    }
                }
            }
            row += inc;
            if row < 0 || row >= n {
                row -= inc;
                inc = -inc;
                break;
            }
        }
        col -= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codewords;
    use crate::segments::Segment;

    fn v(n: u8) -> Version {
        Version::new(n).unwrap()
    }

    fn sample_stream(version: Version, level: ErrorLevel) -> Vec<u8> {
        codewords::build_codewords(version, level, &[Segment::byte_text("sample")]).unwrap()
    }

    #[test]
    fn bch_format_known_values() {
        assert_eq!(bch_format(0b00_000), 0b101010000010010); // M, pattern 0
        assert_eq!(bch_format(0b01_000), 0b111011111000100); // L, pattern 0
        assert_eq!(bch_format(0b10_111), 0b000100000111011); // H, pattern 7
        assert_eq!(bch_format(0b11_011), 0b011101000000110); // Q, pattern 3
    }

    #[test]
    fn bch_version_known_values() {
        assert_eq!(bch_version(7), 0x07C94);
        assert_eq!(bch_version(8), 0x085BC);
        assert_eq!(bch_version(18), 0x12A17);
        assert_eq!(bch_version(40), 0x28C69);
    }

    #[test]
    fn every_cell_is_decided_after_build() {
        for (version, level) in [(v(1), ErrorLevel::H), (v(2), ErrorLevel::L), (v(7), ErrorLevel::Q)] {
            let data = sample_stream(version, level);
            let grid = build(version, level, MaskPattern::Pattern0, &data, BuildMode::Final);
            assert_eq!(grid.size(), version.size());
            assert!(grid.is_complete());
        }
    }

    #[test]
    fn finder_patterns_match_the_canonical_template() {
        let data = sample_stream(v(1), ErrorLevel::L);
        let grid = build(v(1), ErrorLevel::L, MaskPattern::Pattern3, &data, BuildMode::Final);
        let n = grid.size();
        let template = |r: usize, c: usize| {
            r == 0 || r == 6 || c == 0 || c == 6 || ((2..=4).contains(&r) && (2..=4).contains(&c))
        };
        for r in 0..7 {
            for c in 0..7 {
                assert_eq!(grid.is_dark(r, c), template(r, c));
                assert_eq!(grid.is_dark(n - 7 + r, c), template(r, c));
                assert_eq!(grid.is_dark(r, n - 7 + c), template(r, c));
            }
        }
        // Separators are light.
        for i in 0..8 {
            assert!(!grid.is_dark(7, i));
            assert!(!grid.is_dark(i, 7));
        }
    }

    #[test]
    fn timing_pattern_alternates_starting_dark() {
        let data = sample_stream(v(2), ErrorLevel::M);
        let grid = build(v(2), ErrorLevel::M, MaskPattern::Pattern0, &data, BuildMode::Final);
        let n = grid.size();
        for i in 8..n - 8 {
            assert_eq!(grid.is_dark(6, i), i % 2 == 0);
            assert_eq!(grid.is_dark(i, 6), i % 2 == 0);
        }
    }

    #[test]
    fn alignment_pattern_present_from_version_2() {
        let data = sample_stream(v(2), ErrorLevel::M);
        let grid = build(v(2), ErrorLevel::M, MaskPattern::Pattern0, &data, BuildMode::Final);
        // Centre (18, 18): dark centre, light ring, dark border.
        assert!(grid.is_dark(18, 18));
        assert!(!grid.is_dark(17, 18));
        assert!(grid.is_dark(16, 18));
        assert!(grid.is_dark(20, 20));
    }

    #[test]
    fn trial_builds_leave_format_cells_light() {
        let data = sample_stream(v(1), ErrorLevel::H);
        let trial = build(v(1), ErrorLevel::H, MaskPattern::Pattern0, &data, BuildMode::Trial);
        let n = trial.size();
        for i in 0..6 {
            assert!(!trial.is_dark(8, i));
            assert!(!trial.is_dark(i, 8));
        }
        assert!(!trial.is_dark(n - 8, 8));

        let final_grid =
            build(v(1), ErrorLevel::H, MaskPattern::Pattern0, &data, BuildMode::Final);
        assert!(final_grid.is_dark(n - 8, 8));
    }

    #[test]
    fn data_region_capacity_matches_the_standard() {
        // Count the cells left for data after the function patterns.
        for (version, expected) in [(v(1), 208usize), (v(2), 359)] {
            let mut grid = Modules::new(version.size());
            place_finders(&mut grid);
            place_alignment(&mut grid, version);
            place_timing(&mut grid);
            place_format(&mut grid, ErrorLevel::L, MaskPattern::Pattern0, BuildMode::Trial);
            if version.number() >= 7 {
                place_version(&mut grid, version, BuildMode::Trial);
            }
            let free = grid.cells.iter().filter(|c| c.is_none()).count();
            assert_eq!(free, expected);
        }
    }

    #[test]
    fn committed_mask_minimises_the_trial_penalty() {
        let data = sample_stream(v(1), ErrorLevel::Q);
        let (chosen, _) = choose_mask(v(1), ErrorLevel::Q, &data);
        let scores: Vec<u32> = MaskPattern::ALL
            .iter()
            .map(|&pattern| {
                let trial = build(v(1), ErrorLevel::Q, pattern, &data, BuildMode::Trial);
                penalty::score(trial.size(), |r, c| trial.is_dark(r, c))
            })
            .collect();
        let min = *scores.iter().min().unwrap();
        assert_eq!(scores[chosen.index() as usize], min);
        // Lowest index wins ties.
        let first_min = scores.iter().position(|&s| s == min).unwrap();
        assert_eq!(chosen.index() as usize, first_min);
    }

    #[test]
    fn builds_are_deterministic() {
        let data = sample_stream(v(3), ErrorLevel::M);
        let (mask_a, grid_a) = choose_mask(v(3), ErrorLevel::M, &data);
        let (mask_b, grid_b) = choose_mask(v(3), ErrorLevel::M, &data);
        assert_eq!(mask_a, mask_b);
        assert_eq!(grid_a, grid_b);
    }
}
