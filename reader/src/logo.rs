//! Header logo decoding.
//!
//! The 48 logo bytes describe a 48x8 monochrome bitmap. Each byte is a 4x2
//! block: the high nibble is the top row, the low nibble the bottom row,
//! most significant bit leftmost. The first 24 bytes cover the top half of
//! the image and the last 24 the bottom half; within a half, byte pairs
//! stack vertically.

use gb_dumper::header::{LOGO_LEN, NINTENDO_LOGO};

use crate::error::{ReaderError, Result};

pub const LOGO_WIDTH: usize = 48;
pub const LOGO_HEIGHT: usize = 8;

pub struct LogoBitmap {
    pixels: [[bool; LOGO_WIDTH]; LOGO_HEIGHT],
}

impl LogoBitmap {
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != LOGO_LEN {
            return Err(ReaderError::InvalidLogoLength(data.len()));
        }

        let mut bitmap = LogoBitmap {
            pixels: [[false; LOGO_WIDTH]; LOGO_HEIGHT],
        };
        for half in 0..2 {
            for pair in 0..12 {
                let i = half * 24 + pair * 2;
                let x = pair * 4;
                let y = half * 4;
                bitmap.draw_block(x, y, data[i]);
                bitmap.draw_block(x, y + 2, data[i + 1]);
            }
        }
        Ok(bitmap)
    }

    fn draw_block(&mut self, x: usize, y: usize, byte: u8) {
        for col in 0..4 {
            let mask = 0x08 >> col;
            self.pixels[y][x + col] = (byte >> 4) & mask != 0;
            self.pixels[y + 1][x + col] = byte & mask != 0;
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y][x]
    }

    /// One text line per pixel row.
    pub fn render(&self, set: char, unset: char) -> String {
        let mut out = String::with_capacity(LOGO_HEIGHT * (LOGO_WIDTH + 1));
        for row in &self.pixels {
            out.extend(row.iter().map(|&p| if p { set } else { unset }));
            out.push('\n');
        }
        out
    }
}

/// Whether a cartridge's logo would pass the boot ROM check.
pub fn is_reference_logo(data: &[u8]) -> bool {
    data == &NINTENDO_LOGO[..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_length() {
        assert!(matches!(
            LogoBitmap::decode(&[0u8; 47]),
            Err(ReaderError::InvalidLogoLength(47))
        ));
    }

    #[test]
    fn test_block_layout() {
        let mut data = [0u8; LOGO_LEN];
        data[0] = 0x80; // top row, leftmost pixel
        data[1] = 0x01; // fourth row, rightmost pixel of the block
        data[24] = 0x10; // bottom half, top row, rightmost pixel
        let logo = LogoBitmap::decode(&data).unwrap();

        assert!(logo.pixel(0, 0));
        assert!(logo.pixel(3, 3));
        assert!(logo.pixel(3, 4));
        let set: usize = (0..LOGO_HEIGHT)
            .map(|y| (0..LOGO_WIDTH).filter(|&x| logo.pixel(x, y)).count())
            .sum();
        assert_eq!(set, 3);
    }

    #[test]
    fn test_reference_logo_renders() {
        let logo = LogoBitmap::decode(&NINTENDO_LOGO).unwrap();
        let text = logo.render('#', '.');
        assert_eq!(text.lines().count(), LOGO_HEIGHT);
        assert!(text.lines().all(|l| l.len() == LOGO_WIDTH));
        // 0xCE: top row of the "N" block is ##..
        assert!(text.starts_with("##.."));
        assert!(is_reference_logo(&NINTENDO_LOGO));
        assert!(!is_reference_logo(&[0u8; LOGO_LEN]));
    }
}
