/// Output surface description and the color buffer the renderer fills
use crate::vector::Vec3;

/// RGB, one byte per channel
pub type Color = [u8; 3];

/// Dimensions of the target surface in pixels.
///
/// Owned by whoever presents the frame and handed to the renderer
/// explicitly; it holds no display state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub width: usize,
    pub height: usize,
}

impl Screen {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Screen-space `(x, z)` in `[-1, 1]` to a pixel column and row.
    /// Truncates toward zero and does not clamp.
    pub fn screen_to_pixel(&self, x: f64, z: f64) -> (i64, i64) {
        (
            ((x + 1.0) * self.width as f64 / 2.0) as i64,
            ((z + 1.0) * self.height as f64 / 2.0) as i64,
        )
    }

    /// Centre of pixel `(x, y)` in screen space, with the depth slot zeroed.
    pub fn pixel_to_screen(&self, x: usize, y: usize) -> Vec3 {
        Vec3::new(
            2.0 * (x as f64 + 0.5) / self.width as f64 - 1.0,
            0.0,
            2.0 * (y as f64 + 0.5) / self.height as f64 - 1.0,
        )
    }
}

/// Row-major color buffer. Row 0 is the bottom of the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Rows from the top of the image down, as a display expects them.
    pub fn rows_top_down(&self) -> impl Iterator<Item = &[Color]> + '_ {
        self.pixels.chunks(self.width.max(1)).rev()
    }

    /// Packed RGB bytes, top row first.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.rows_top_down().flatten().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_ratio() {
        assert!((Screen::new(320, 240).ratio() - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_screen_to_pixel() {
        let screen = Screen::new(100, 50);
        assert_eq!(screen.screen_to_pixel(-1.0, -1.0), (0, 0));
        assert_eq!(screen.screen_to_pixel(1.0, 1.0), (100, 50));
        assert_eq!(screen.screen_to_pixel(0.0, 0.0), (50, 25));
        // Truncation, not flooring, below the left edge
        assert_eq!(screen.screen_to_pixel(-1.01, -1.0), (0, 0));
        assert_eq!(screen.screen_to_pixel(-1.1, -1.0), (-5, 0));
    }

    #[test]
    fn test_pixel_to_screen_centres() {
        let screen = Screen::new(4, 2);
        assert_eq!(screen.pixel_to_screen(0, 0), Vec3::new(-0.75, 0.0, -0.5));
        assert_eq!(screen.pixel_to_screen(3, 1), Vec3::new(0.75, 0.0, 0.5));

        for x in 0..4 {
            for y in 0..2 {
                let p = screen.pixel_to_screen(x, y);
                assert_eq!(screen.screen_to_pixel(p.x, p.z), (x as i64, y as i64));
            }
        }
    }

    #[test]
    fn test_framebuffer_access() {
        let mut buffer = Framebuffer::new(3, 2, [1, 2, 3]);
        assert_eq!(buffer.get(2, 1), Some([1, 2, 3]));
        assert_eq!(buffer.get(3, 0), None);

        buffer.set(0, 0, [9, 9, 9]);
        buffer.set(5, 5, [7, 7, 7]);
        assert_eq!(buffer.get(0, 0), Some([9, 9, 9]));
        assert_eq!(buffer.pixels().iter().filter(|&&c| c == [9, 9, 9]).count(), 1);
    }

    #[test]
    fn test_rows_top_down() {
        let mut buffer = Framebuffer::new(2, 2, [0, 0, 0]);
        buffer.set(1, 0, [255, 0, 0]);
        let rows: Vec<&[Color]> = buffer.rows_top_down().collect();
        assert_eq!(rows[1], &[[0, 0, 0], [255, 0, 0]]);

        let bytes = buffer.to_rgb_bytes();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[9..], &[255, 0, 0]);
    }
}
