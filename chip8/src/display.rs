pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Monochrome 64x32 frame buffer, row-major.
pub struct Display {
    pixels: [bool; DISPLAY_WIDTH * DISPLAY_HEIGHT],
}

impl Display {
    pub fn new() -> Display {
        Display {
            pixels: [false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.iter_mut() {
            *pixel = false;
        }
    }

    /// XORs `sprite` onto the screen with its top-left corner at `(x, y)`.
    ///
    /// The origin wraps around the screen, but the sprite itself does not: rows
    /// and columns that run past the bottom or right edge are clipped.
    /// Returns whether any lit pixel was switched off.
    pub fn draw(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let x = x % DISPLAY_WIDTH;
        let y = y % DISPLAY_HEIGHT;
        let mut collision_bit = false;

        for (sy, byte) in sprite.iter().enumerate() {
            let dy = y + sy;
            if dy >= DISPLAY_HEIGHT {
                break;
            }
            for sx in 0..8 {
                let dx = x + sx;
                if dx >= DISPLAY_WIDTH {
                    break;
                }

                let bit_mask = 0b1000_0000 >> sx;
                if (byte & bit_mask) != 0 {
                    let index = dy * DISPLAY_WIDTH + dx;
                    if self.pixels[index] {
                        collision_bit = true;
                    }
                    self.pixels[index] ^= true;
                }
            }
        }

        collision_bit
    }

    /// Whether the pixel at `(x, y)` is lit. Coordinates off the screen read as unlit.
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return false;
        }
        self.pixels[y * DISPLAY_WIDTH + x]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }
}
