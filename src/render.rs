//! Read-only surface renderers: ASCII art, HTML table, and SVG path data.
//!
//! Renderers never touch the encoder; they consume any `ModuleSource`.

use std::fmt::Write;

use crate::matrix::Modules;

/// The read-only view renderers consume.
pub trait ModuleSource {
    /// Side length of the symbol in modules.
    fn module_count(&self) -> usize;
    /// Darkness of the module at (row, col); both must be in range.
    fn is_dark(&self, row: usize, col: usize) -> bool;
}

impl ModuleSource for Modules {
    fn module_count(&self) -> usize {
        self.size()
    }

    fn is_dark(&self, row: usize, col: usize) -> bool {
        Modules::is_dark(self, row, col)
    }
}

/// Darkness of a virtual cell in a grid padded by `margin` light modules.
fn padded_dark<M: ModuleSource>(source: &M, margin: usize, row: usize, col: usize) -> bool {
    let n = source.module_count();
    if row < margin || col < margin {
        return false;
    }
    let (r, c) = (row - margin, col - margin);
    r < n && c < n && source.is_dark(r, c)
}

/// Render the symbol as ASCII art.
///
/// With `cell_size >= 2` each module becomes `cell_size` text lines of
/// `cell_size` two-character cells (`██` dark, spaces light). A
/// `cell_size` of 1 switches to half-block compression, mapping two module
/// rows onto one text line with `█`, `▀`, `▄` and space; 0 defaults to 1
/// and lands in the same mode. `margin` counts light modules on every side.
pub fn ascii_text<M: ModuleSource>(source: &M, cell_size: usize, margin: usize) -> String {
    let cell_size = cell_size.max(1);
    if cell_size == 1 {
        return half_block_ascii(source, margin);
    }

    let total = source.module_count() + 2 * margin;
    let mut out = String::new();
    for row in 0..total {
        let mut line = String::new();
        for col in 0..total {
            let cell = if padded_dark(source, margin, row, col) {
                "██"
            } else {
                "  "
            };
            for _ in 0..cell_size {
                line.push_str(cell);
            }
        }
        for _ in 0..cell_size {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

fn half_block_ascii<M: ModuleSource>(source: &M, margin: usize) -> String {
    let total = source.module_count() + 2 * margin;
    let mut out = String::new();
    let mut row = 0;
    while row < total {
        for col in 0..total {
            let top = padded_dark(source, margin, row, col);
            let bottom = row + 1 < total && padded_dark(source, margin, row + 1, col);
            out.push(match (top, bottom) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
        row += 2;
    }
    out
}

/// Render the symbol as an HTML table, one `<td>` per module. `cell_size`
/// and `margin` are pixel sizes carried by the inline styles.
pub fn html_table<M: ModuleSource>(source: &M, cell_size: usize, margin: usize) -> String {
    let n = source.module_count();
    let mut out = String::new();
    let _ = write!(
        out,
        "<table style=\"border-width: 0px; border-style: none; \
         border-collapse: collapse; padding: 0px; margin: {margin}px;\"><tbody>"
    );
    for row in 0..n {
        out.push_str("<tr>");
        for col in 0..n {
            let color = if source.is_dark(row, col) {
                "#000000"
            } else {
                "#ffffff"
            };
            let _ = write!(
                out,
                "<td style=\"border-width: 0px; border-style: none; \
                 border-collapse: collapse; padding: 0px; margin: 0px; \
                 width: {cell_size}px; height: {cell_size}px; \
                 background-color: {color};\"></td>"
            );
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

/// Render the dark modules as an SVG path `d` string. Each dark module
/// contributes one closed square subpath; `margin` is the pixel offset of
/// the symbol inside the drawing.
pub fn svg_path<M: ModuleSource>(source: &M, cell_size: usize, margin: usize) -> String {
    let n = source.module_count();
    let mut out = String::new();
    for row in 0..n {
        for col in 0..n {
            if source.is_dark(row, col) {
                let x = col * cell_size + margin;
                let y = row * cell_size + margin;
                let s = cell_size;
                let _ = write!(out, "M{x},{y}l{s},0 0,{s} -{s},0 0,-{s}z ");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        n: usize,
        cells: Vec<bool>,
    }

    impl ModuleSource for Fake {
        fn module_count(&self) -> usize {
            self.n
        }
        fn is_dark(&self, row: usize, col: usize) -> bool {
            self.cells[row * self.n + col]
        }
    }

    fn diagonal() -> Fake {
        Fake {
            n: 2,
            cells: vec![true, false, false, true],
        }
    }

    #[test]
    fn ascii_full_blocks() {
        let text = ascii_text(&diagonal(), 2, 0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "████    ");
        assert_eq!(lines[1], "████    ");
        assert_eq!(lines[2], "    ████");
        assert_eq!(lines[3], "    ████");
    }

    #[test]
    fn ascii_margin_adds_light_modules() {
        let text = ascii_text(&diagonal(), 2, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "        ");
        assert_eq!(lines[2], "  ████  ");
    }

    #[test]
    fn ascii_half_blocks_compress_row_pairs() {
        let text = ascii_text(&diagonal(), 1, 0);
        assert_eq!(text, "▀▄\n");
        // Cell size 0 defaults into the same mode.
        assert_eq!(ascii_text(&diagonal(), 0, 0), "▀▄\n");
    }

    #[test]
    fn ascii_half_blocks_odd_row_count() {
        let single = Fake {
            n: 1,
            cells: vec![true],
        };
        assert_eq!(ascii_text(&single, 1, 0), "▀\n");
    }

    #[test]
    fn html_table_has_one_td_per_module() {
        let html = html_table(&diagonal(), 4, 8);
        assert_eq!(html.matches("<td").count(), 4);
        assert_eq!(html.matches("#000000").count(), 2);
        assert_eq!(html.matches("#ffffff").count(), 2);
        assert!(html.starts_with("<table"));
        assert!(html.ends_with("</tbody></table>"));
        assert!(html.contains("margin: 8px"));
        assert!(html.contains("width: 4px"));
    }

    #[test]
    fn svg_path_emits_one_subpath_per_dark_module() {
        let d = svg_path(&diagonal(), 3, 6);
        assert_eq!(d.matches('M').count(), 2);
        assert!(d.starts_with("M6,6l3,0 0,3 -3,0 0,-3z "));
        assert!(d.contains("M9,9l3,0 0,3 -3,0 0,-3z "));
    }
}
