//! GIF87a writer over a two-colour palette, with raster LZW compression.

use std::collections::HashMap;

use base64::prelude::{Engine, BASE64_STANDARD};
use log::trace;

use crate::render::ModuleSource;

/// Palette index of dark pixels.
const BLACK: u8 = 0;
/// Palette index of light pixels.
const WHITE: u8 = 1;

const CLEAR_CODE: u16 = 2;
const END_CODE: u16 = 3;
/// The code table never grows past 12-bit codes.
const MAX_TABLE_SIZE: u16 = 0xFFF;

/// GIF packs LZW codes least-significant-bit first.
#[derive(Debug, Default)]
struct LsbPacker {
    out: Vec<u8>,
    buffer: u32,
    bits: u32,
}

impl LsbPacker {
    fn write(&mut self, value: u16, width: u32) {
        self.buffer |= (value as u32) << self.bits;
        self.bits += width;
        while self.bits >= 8 {
            self.out.push((self.buffer & 0xFF) as u8);
            self.buffer >>= 8;
            self.bits -= 8;
        }
    }

    fn into_vec(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.out.push((self.buffer & 0xFF) as u8);
        }
        self.out
    }
}

/// LZW-compress a stream of 1-bit pixels with min-code-size 2.
///
/// The dictionary is seeded with the two pixel codes plus clear and end;
/// codes start 3 bits wide and widen each time the table size reaches
/// `1 << width`. A clear code is emitted once up front and the table is
/// simply left frozen when it fills.
fn lzw_encode(pixels: &[u8]) -> Vec<u8> {
    let mut packer = LsbPacker::default();
    let mut dict: HashMap<(u16, u8), u16> = HashMap::new();
    let mut next_code: u16 = 4;
    let mut width: u32 = 3;

    packer.write(CLEAR_CODE, width);

    let mut pixels = pixels.iter().copied();
    let Some(first) = pixels.next() else {
        packer.write(END_CODE, width);
        return packer.into_vec();
    };
    let mut current = first as u16;

    for pixel in pixels {
        if let Some(&code) = dict.get(&(current, pixel)) {
            current = code;
            continue;
        }
        packer.write(current, width);
        if next_code < MAX_TABLE_SIZE {
            if next_code as u32 == 1 << width {
                width += 1;
            }
            dict.insert((current, pixel), next_code);
            next_code += 1;
        }
        current = pixel as u16;
    }

    packer.write(current, width);
    packer.write(END_CODE, width);
    packer.into_vec()
}

/// Encode the symbol as GIF87a bytes. `cell_size` is pixels per module and
/// `margin` is the light border in pixels.
pub fn gif_bytes<M: ModuleSource>(source: &M, cell_size: usize, margin: usize) -> Vec<u8> {
    let n = source.module_count();
    let size = n * cell_size + 2 * margin;

    let mut pixels = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let dark = x >= margin
                && y >= margin
                && (x - margin) / cell_size < n
                && (y - margin) / cell_size < n
                && source.is_dark((y - margin) / cell_size, (x - margin) / cell_size);
            pixels.push(if dark { BLACK } else { WHITE });
        }
    }

    let compressed = lzw_encode(&pixels);
    trace!("LZW packed {} pixels into {} bytes", pixels.len(), compressed.len());

    let mut out = Vec::with_capacity(compressed.len() + 64);
    out.extend_from_slice(b"GIF87a");

    // Logical screen descriptor: global colour table of 2 entries.
    out.extend_from_slice(&(size as u16).to_le_bytes());
    out.extend_from_slice(&(size as u16).to_le_bytes());
    out.push(0x80);
    out.push(0x00); // background colour index
    out.push(0x00); // pixel aspect ratio

    // Palette: black, then white.
    out.extend_from_slice(&[0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF]);

    // Image descriptor, no local colour table.
    out.push(0x2C);
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&(size as u16).to_le_bytes());
    out.extend_from_slice(&(size as u16).to_le_bytes());
    out.push(0x00);

    // LZW minimum code size, then the codes in sub-blocks of at most 255.
    out.push(0x02);
    for block in compressed.chunks(255) {
        out.push(block.len() as u8);
        out.extend_from_slice(block);
    }
    out.push(0x00);
    out.push(b';');
    out
}

/// Encode the symbol as a `data:image/gif;base64,` URL.
pub fn gif_data_url<M: ModuleSource>(source: &M, cell_size: usize, margin: usize) -> String {
    format!(
        "data:image/gif;base64,{}",
        BASE64_STANDARD.encode(gif_bytes(source, cell_size, margin))
    )
}
