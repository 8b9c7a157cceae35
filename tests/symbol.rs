//! End-to-end scenarios across the public API.

use base64::prelude::{Engine, BASE64_STANDARD};
use qrforge::{EncodeMode, ErrorLevel, QrError, QrSymbol};

fn made(version: u8, level: ErrorLevel, text: &str, mode: EncodeMode) -> QrSymbol {
    let mut symbol = QrSymbol::new(version, level).unwrap();
    symbol.add_data_in_mode(text, mode);
    symbol.make().unwrap();
    symbol
}

#[test]
fn hello_world_fits_version_1_high() {
    let symbol = made(1, ErrorLevel::H, "HELLO WORLD", EncodeMode::Alphanumeric);
    assert_eq!(symbol.module_count().unwrap(), 21);

    // The three finder corners are dark; the separator next to them is not.
    assert!(symbol.is_dark(0, 0).unwrap());
    assert!(symbol.is_dark(20, 0).unwrap());
    assert!(symbol.is_dark(0, 20).unwrap());
    assert!(!symbol.is_dark(7, 7).unwrap());
    // The fixed dark module below the bottom-left finder.
    assert!(symbol.is_dark(13, 8).unwrap());
}

#[test]
fn auto_selected_url_renders_a_png_data_url() {
    let mut symbol = QrSymbol::new(0, ErrorLevel::L).unwrap();
    symbol.add_data("https://neabyte.com/");
    symbol.make().unwrap();
    assert!(symbol.version().unwrap().number() >= 2);

    let url = symbol.png_data_url(4, 16, None, None).unwrap();
    assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));

    let bytes = BASE64_STANDARD
        .decode(url.strip_prefix("data:image/png;base64,").unwrap())
        .unwrap();
    assert_eq!(&bytes[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
}

#[test]
fn overflow_on_a_pinned_version() {
    let mut symbol = QrSymbol::new(1, ErrorLevel::H).unwrap();
    symbol.add_data(&"x".repeat(100));
    assert!(matches!(symbol.make(), Err(QrError::CodeOverflow { .. })));
}

#[test]
fn numeric_mode_rejects_letters_during_make() {
    let mut symbol = QrSymbol::new(1, ErrorLevel::L).unwrap();
    symbol.add_data_in_mode("12a", EncodeMode::Numeric);
    assert_eq!(
        symbol.make(),
        Err(QrError::BadCharacter {
            mode: EncodeMode::Numeric,
            offset: 2
        })
    );
}

#[test]
fn gif_round_trip_structure() {
    let symbol = made(1, ErrorLevel::M, "GIF", EncodeMode::Alphanumeric);
    let url = symbol.gif_data_url(4, 0).unwrap();
    let bytes = BASE64_STANDARD
        .decode(url.strip_prefix("data:image/gif;base64,").unwrap())
        .unwrap();

    assert_eq!(&bytes[..6], b"GIF87a");
    assert_eq!(*bytes.last().unwrap(), b';');
    // Palette is exactly black then white.
    assert_eq!(&bytes[13..19], &[0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF]);

    // Walk the LZW sub-blocks to the terminator and trailer.
    let mut pos = 19;
    assert_eq!(bytes[pos], 0x2C);
    pos += 10; // image descriptor
    assert_eq!(bytes[pos], 0x02); // LZW minimum code size
    pos += 1;
    loop {
        let len = bytes[pos] as usize;
        pos += 1;
        if len == 0 {
            break;
        }
        pos += len;
    }
    assert_eq!(bytes[pos], b';');
    assert_eq!(pos, bytes.len() - 1);
}

#[test]
fn kanji_text_encodes_at_version_1() {
    let symbol = made(0, ErrorLevel::L, "点茗", EncodeMode::Kanji);
    assert_eq!(symbol.version().unwrap().number(), 1);
    assert_eq!(symbol.module_count().unwrap(), 21);
}

#[test]
fn renderer_geometry_is_consistent() {
    let symbol = made(2, ErrorLevel::Q, "RENDER", EncodeMode::Byte);
    let n = symbol.module_count().unwrap();
    assert_eq!(n, 25);

    let dark_count = (0..n)
        .flat_map(|r| (0..n).map(move |c| (r, c)))
        .filter(|&(r, c)| symbol.is_dark(r, c).unwrap())
        .count();

    let path = symbol.svg_path(10, 0).unwrap();
    assert_eq!(path.matches('M').count(), dark_count);

    let html = symbol.html_table(8, 0).unwrap();
    assert_eq!(html.matches("<td").count(), n * n);
    assert_eq!(html.matches("#000000").count(), dark_count);

    let ascii = symbol.ascii_text(2, 4).unwrap();
    // (n + 2 * margin) module rows, two lines per module row.
    assert_eq!(ascii.lines().count(), 2 * (n + 8));
}

#[test]
fn identical_inputs_build_identical_symbols() {
    let a = made(3, ErrorLevel::M, "DETERMINISM", EncodeMode::Byte);
    let b = made(3, ErrorLevel::M, "DETERMINISM", EncodeMode::Byte);
    assert_eq!(a.mask_pattern().unwrap(), b.mask_pattern().unwrap());
    let n = a.module_count().unwrap();
    for row in 0..n {
        for col in 0..n {
            assert_eq!(a.is_dark(row, col).unwrap(), b.is_dark(row, col).unwrap());
        }
    }
}

#[test]
fn colored_png_switches_to_rgb() {
    let symbol = made(1, ErrorLevel::L, "RGB", EncodeMode::Byte);
    let bytes = symbol
        .png_bytes(2, 4, Some([0x11, 0x22, 0x33]), Some([0xEE, 0xEE, 0xEE]))
        .unwrap();
    // Colour type lives at byte 25 of the file: IHDR data offset 9.
    assert_eq!(bytes[8 + 8 + 9], 2);

    let gray = symbol.png_bytes(2, 4, None, None).unwrap();
    assert_eq!(gray[8 + 8 + 9], 0);
}
