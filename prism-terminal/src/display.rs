/// Terminal presentation of a finished framebuffer
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;

use prism_core::screen::Color as Rgb;
use prism_core::Framebuffer;

/// Character luminosity ramp for the ASCII fallback (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '\u{2580}';

/// How pixels are turned into terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// 24-bit color, two pixel rows per cell
    #[default]
    TrueColor,
    /// Luminance ramp characters for terminals without true color
    Ascii,
}

/// Number of terminal rows needed to show `pixel_rows` rows of pixels.
pub fn cell_rows(pixel_rows: usize) -> usize {
    pixel_rows.div_ceil(2)
}

/// Perceived brightness in `[0, 1]` (ITU-R BT.601 weights).
pub fn luminance(color: Rgb) -> f64 {
    let [r, g, b] = color.map(|c| c as f64 / 255.0);
    0.299 * r + 0.587 * g + 0.114 * b
}

pub fn ramp_char(luminance: f64) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = (luminance.clamp(0.0, 1.0) * last as f64).round() as usize;
    LUMINOSITY_RAMP[index.min(last)]
}

fn average(a: Rgb, b: Rgb) -> Rgb {
    [0, 1, 2].map(|i| ((a[i] as u16 + b[i] as u16) / 2) as u8)
}

fn rgb(color: Rgb) -> Color {
    Color::Rgb {
        r: color[0],
        g: color[1],
        b: color[2],
    }
}

/// Queue the whole frame at the current cursor position; the caller flushes.
pub fn draw<W: Write>(
    frame: &Framebuffer,
    mode: DisplayMode,
    writer: &mut W,
) -> std::io::Result<()> {
    let rows: Vec<&[Rgb]> = frame.rows_top_down().collect();

    for pair in rows.chunks(2) {
        let top = pair[0];
        let bottom = pair.get(1).copied();

        for (x, &upper) in top.iter().enumerate() {
            let lower = bottom.map(|row| row[x]);
            match mode {
                DisplayMode::TrueColor => {
                    writer.queue(SetForegroundColor(rgb(upper)))?;
                    match lower {
                        Some(lower) => writer.queue(SetBackgroundColor(rgb(lower)))?,
                        None => writer.queue(SetBackgroundColor(Color::Reset))?,
                    };
                    writer.queue(Print(HALF_BLOCK))?;
                }
                DisplayMode::Ascii => {
                    let cell = lower.map_or(upper, |lower| average(upper, lower));
                    let character = ramp_char(luminance(cell));

                    // Color based on character intensity
                    let color = match character {
                        ' ' | '.' | ':' => Color::DarkGrey,
                        '-' | '=' => Color::Grey,
                        '+' | '*' => Color::White,
                        _ => Color::Cyan,
                    };
                    writer.queue(SetForegroundColor(color))?;
                    writer.queue(Print(character))?;
                }
            }
        }
        writer.queue(ResetColor)?;
        writer.queue(cursor::MoveToNextLine(1))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_ends() {
        assert_eq!(ramp_char(luminance([0, 0, 0])), ' ');
        assert_eq!(ramp_char(luminance([255, 255, 255])), '@');
        assert_eq!(ramp_char(2.0), '@');
        assert_eq!(ramp_char(-1.0), ' ');
    }

    #[test]
    fn test_white_luminance_reaches_top_of_ramp() {
        let white = luminance([255, 255, 255]);
        assert!((white - 1.0).abs() < 1e-9);
        assert_eq!(ramp_char(white), '@');
        assert_eq!(ramp_char(0.44), '=');
    }

    #[test]
    fn test_cell_rows() {
        assert_eq!(cell_rows(0), 0);
        assert_eq!(cell_rows(4), 2);
        assert_eq!(cell_rows(5), 3);
    }

    #[test]
    fn test_truecolor_uses_half_blocks() {
        let frame = Framebuffer::new(3, 5, [10, 20, 30]);
        let mut out = Vec::new();
        draw(&frame, DisplayMode::TrueColor, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(HALF_BLOCK).count(), 3 * cell_rows(5));
        assert!(text.contains("38;2;10;20;30"));
    }

    #[test]
    fn test_ascii_mode_prints_ramp() {
        let mut frame = Framebuffer::new(2, 2, [0, 0, 0]);
        frame.set(1, 0, [255, 255, 255]);
        frame.set(1, 1, [255, 255, 255]);
        let mut out = Vec::new();
        draw(&frame, DisplayMode::Ascii, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('@'));
        assert!(!text.contains(HALF_BLOCK));
    }
}
