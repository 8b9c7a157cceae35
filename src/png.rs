//! PNG writer: filtered scanlines, zlib-wrapped DEFLATE, and chunk framing.

use base64::prelude::{Engine, BASE64_STANDARD};
use log::trace;

use crate::checksum::{Adler32, Crc32};
use crate::deflate::deflate;
use crate::render::ModuleSource;

/// An RGB colour as used for the optional foreground/background pair.
pub type Rgb = [u8; 3];

const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Encode the symbol as PNG bytes. `cell_size` is pixels per module and
/// `margin` the light border in pixels.
///
/// Without colours the image is 8-bit grayscale (dark 0x00, light 0xFF);
/// with a (foreground, background) pair it is 8-bit RGB.
pub fn png_bytes<M: ModuleSource>(
    source: &M,
    cell_size: usize,
    margin: usize,
    colors: Option<(Rgb, Rgb)>,
) -> Vec<u8> {
    let n = source.module_count();
    let size = n * cell_size + 2 * margin;

    // Scanlines with filter byte 0 (None) up front.
    let channels = if colors.is_some() { 3 } else { 1 };
    let mut raw = Vec::with_capacity(size * (size * channels + 1));
    for y in 0..size {
        raw.push(0x00);
        for x in 0..size {
            let dark = x >= margin
                && y >= margin
                && (x - margin) / cell_size < n
                && (y - margin) / cell_size < n
                && source.is_dark((y - margin) / cell_size, (x - margin) / cell_size);
            match colors {
                Some((fg, bg)) => raw.extend_from_slice(if dark { &fg } else { &bg }),
                None => raw.push(if dark { 0x00 } else { 0xFF }),
            }
        }
    }

    let idat = zlib_wrap(&raw);
    trace!("deflated {} scanline bytes into {}", raw.len(), idat.len());

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(size as u32).to_be_bytes());
    ihdr.extend_from_slice(&(size as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(if colors.is_some() { 2 } else { 0 }); // colour type
    ihdr.push(0); // compression
    ihdr.push(0); // filter
    ihdr.push(0); // interlace

    let mut out = Vec::with_capacity(idat.len() + 128);
    out.extend_from_slice(&SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr);
    write_chunk(&mut out, b"IDAT", &idat);
    write_chunk(&mut out, b"IEND", &[]);
    out
}

/// Encode the symbol as a `data:image/png;base64,` URL.
pub fn png_data_url<M: ModuleSource>(
    source: &M,
    cell_size: usize,
    margin: usize,
    colors: Option<(Rgb, Rgb)>,
) -> String {
    format!(
        "data:image/png;base64,{}",
        BASE64_STANDARD.encode(png_bytes(source, cell_size, margin, colors))
    )
}

/// Wrap a raw DEFLATE stream in the zlib container: the fixed `78 9C`
/// header, then the compressed bytes, then the big-endian Adler-32 of the
/// uncompressed input.
fn zlib_wrap(data: &[u8]) -> Vec<u8> {
    let compressed = deflate(data, 6);
    let mut out = Vec::with_capacity(compressed.len() + 6);
    out.push(0x78);
    out.push(0x9C);
    out.extend_from_slice(&compressed);
    out.extend_from_slice(&Adler32::checksum(data).to_be_bytes());
    out
}

/// Frame one chunk: length, type, data, and CRC-32 over type plus data.
fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    let mut crc = Crc32::new();
    crc.update(chunk_type);
    crc.update(data);
    out.extend_from_slice(&crc.finalize().to_be_bytes());
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

    /// Locate a chunk's data by walking the framing.
    fn find_chunk<'a>(png: &'a [u8], wanted: &[u8; 4]) -> &'a [u8] {
        let mut pos = 8;
        while pos + 8 <= png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            let kind = &png[pos + 4..pos + 8];
            if kind == wanted {
                return &png[pos + 8..pos + 8 + len];
            }
            pos += 12 + len;
        }
        panic!("chunk {wanted:?} not found");
    }

    #[test]
    fn signature_and_chunk_order() {
        let png = png_bytes(&diagonal(), 1, 0, None);
        assert_eq!(&png[..8], &SIGNATURE);
        assert_eq!(&png[12..16], b"IHDR");
        // The file ends with the constant IEND chunk.
        assert_eq!(
            &png[png.len() - 12..],
            &[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]
        );
    }

    #[test]
    fn ihdr_fields_grayscale() {
        let png = png_bytes(&diagonal(), 3, 2, None);
        let ihdr = find_chunk(&png, b"IHDR");
        assert_eq!(ihdr.len(), 13);
        // 2 modules * 3 px + 2 * 2 px margin = 10 px square.
        assert_eq!(&ihdr[..4], &10u32.to_be_bytes());
        assert_eq!(&ihdr[4..8], &10u32.to_be_bytes());
        assert_eq!(&ihdr[8..], &[8, 0, 0, 0, 0]);
    }

    #[test]
    fn ihdr_fields_rgb() {
        let png = png_bytes(&diagonal(), 1, 0, Some(([0, 0, 0], [255, 255, 255])));
        let ihdr = find_chunk(&png, b"IHDR");
        assert_eq!(&ihdr[8..], &[8, 2, 0, 0, 0]);
    }

    #[test]
    fn idat_is_zlib_with_matching_adler() {
        let png = png_bytes(&diagonal(), 1, 0, None);
        let idat = find_chunk(&png, b"IDAT");
        assert_eq!(&idat[..2], &[0x78, 0x9C]);
        // Rebuild the expected scanlines: filter byte + one gray per pixel.
        let raw = [
            0x00, 0x00, 0xFF, //
            0x00, 0xFF, 0x00,
        ];
        let adler = u32::from_be_bytes(idat[idat.len() - 4..].try_into().unwrap());
        assert_eq!(adler, Adler32::checksum(&raw));
    }

    #[test]
    fn chunk_crcs_cover_type_and_data() {
        let png = png_bytes(&diagonal(), 1, 0, None);
        let mut pos = 8;
        while pos + 8 <= png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            let stored =
                u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());
            assert_eq!(stored, Crc32::compute(&png[pos + 4..pos + 8 + len]));
            pos += 12 + len;
        }
        assert_eq!(pos, png.len());
    }

    #[test]
    fn data_url_prefix_covers_the_signature() {
        let url = png_data_url(&diagonal(), 2, 4, None);
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}
