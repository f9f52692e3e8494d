//! Deterministic placeholder frame synthesis.
//!
//! When no extraction strategy can produce a genuine frame, the engine
//! substitutes a synthesized diagnostic image instead of failing the
//! request: a layered gradient background, a faint repeating grid, a
//! centered play glyph, and a caption showing the playback clock.
//!
//! Synthesis is a pure function of the [`PlayerState`] snapshot — the same
//! state always yields bit-identical pixels, which keeps capture behavior
//! reproducible in tests and diagnosable in the field.

use std::time::Duration;

use image::{Rgb, RgbImage};

use crate::player::PlayerState;

/// Width used when the video's natural dimensions are unknown.
pub const DEFAULT_WIDTH: u32 = 1920;

/// Height used when the video's natural dimensions are unknown.
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Grid overlay spacing in pixels.
const GRID_SPACING: u32 = 48;

/// Gradient color at the top of the frame (dark blue).
const BACKGROUND_TOP: [f32; 3] = [18.0, 34.0, 58.0];

/// Gradient color at the bottom of the frame (near black).
const BACKGROUND_BOTTOM: [f32; 3] = [5.0, 8.0, 14.0];

/// Color of the play glyph and caption.
const FOREGROUND: Rgb<u8> = Rgb([226, 232, 240]);

/// Synthesize a placeholder frame for the given player state.
///
/// Sized to the state's last-known video dimensions, falling back to
/// 1920×1080 when they are unknown. Dimensions are clamped to a 16 px
/// minimum so degenerate metadata cannot produce an unusable image.
pub fn synthesize(state: &PlayerState) -> RgbImage {
    let (width, height) = state.dimensions.unwrap_or((DEFAULT_WIDTH, DEFAULT_HEIGHT));
    let (width, height) = (width.max(16), height.max(16));
    log::debug!("synthesizing {width}x{height} placeholder frame");

    let mut image = RgbImage::new(width, height);
    paint_background(&mut image);
    paint_grid(&mut image);
    paint_play_glyph(&mut image);
    paint_caption(&mut image, &format_caption(state.position, state.duration));
    image
}

/// Vertical gradient with a radial lift toward the center.
fn paint_background(image: &mut RgbImage) {
    let (width, height) = image.dimensions();
    let center_x = (width as f32 - 1.0) / 2.0;
    let center_y = (height as f32 - 1.0) / 2.0;
    let max_distance = (center_x * center_x + center_y * center_y).sqrt().max(1.0);

    for y in 0..height {
        let t = y as f32 / (height.max(2) - 1) as f32;
        let base: [f32; 3] = [
            lerp(BACKGROUND_TOP[0], BACKGROUND_BOTTOM[0], t),
            lerp(BACKGROUND_TOP[1], BACKGROUND_BOTTOM[1], t),
            lerp(BACKGROUND_TOP[2], BACKGROUND_BOTTOM[2], t),
        ];
        for x in 0..width {
            let dx = x as f32 - center_x;
            let dy = y as f32 - center_y;
            let falloff = 1.0 - (dx * dx + dy * dy).sqrt() / max_distance;
            let lift = falloff * 26.0;
            image.put_pixel(
                x,
                y,
                Rgb([
                    channel(base[0] + lift),
                    channel(base[1] + lift),
                    channel(base[2] + lift),
                ]),
            );
        }
    }
}

/// Brighten pixels on a repeating grid.
fn paint_grid(image: &mut RgbImage) {
    let (width, height) = image.dimensions();
    for y in 0..height {
        for x in 0..width {
            if x % GRID_SPACING == 0 || y % GRID_SPACING == 0 {
                let pixel = image.get_pixel_mut(x, y);
                for component in pixel.0.iter_mut() {
                    *component = component.saturating_add(14);
                }
            }
        }
    }
}

/// Centered circle outline with a filled play triangle inside.
fn paint_play_glyph(image: &mut RgbImage) {
    let (width, height) = image.dimensions();
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let radius = width.min(height) as f32 / 5.0;
    let ring = (radius / 12.0).max(2.0);

    // Triangle shifted slightly right of center so it reads as centered.
    let triangle_left = center_x - radius * 0.35;
    let triangle_right = center_x + radius * 0.55;
    let triangle_half_height = radius * 0.5;

    let x_start = (center_x - radius - ring).floor().max(0.0) as u32;
    let x_end = ((center_x + radius + ring).ceil() as u32).min(width.saturating_sub(1));
    let y_start = (center_y - radius - ring).floor().max(0.0) as u32;
    let y_end = ((center_y + radius + ring).ceil() as u32).min(height.saturating_sub(1));

    for y in y_start..=y_end {
        for x in x_start..=x_end {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            let dx = px - center_x;
            let dy = py - center_y;
            let distance = (dx * dx + dy * dy).sqrt();

            let on_ring = distance <= radius && distance >= radius - ring;
            let in_triangle = px >= triangle_left && px <= triangle_right && {
                let taper = 1.0 - (px - triangle_left) / (triangle_right - triangle_left);
                (py - center_y).abs() <= triangle_half_height * taper
            };

            if on_ring || in_triangle {
                image.put_pixel(x, y, FOREGROUND);
            }
        }
    }
}

/// Render the playback clock bottom-center from the embedded glyph table.
fn paint_caption(image: &mut RgbImage, caption: &str) {
    let (width, height) = image.dimensions();
    let scale = (height / 240).max(1);
    let advance = (GLYPH_WIDTH as u32 + 1) * scale;
    let text_width = (caption.chars().count() as u32 * advance).saturating_sub(scale);
    let text_height = GLYPH_HEIGHT as u32 * scale;
    let margin = (height / 16).max(8);

    let origin_x = width.saturating_sub(text_width) / 2;
    let origin_y = height.saturating_sub(text_height + margin);

    let mut pen_x = origin_x;
    for character in caption.chars() {
        if let Some(rows) = glyph(character) {
            for (row_index, row_bits) in rows.iter().enumerate() {
                for column in 0..GLYPH_WIDTH {
                    if row_bits & (1 << (GLYPH_WIDTH - 1 - column)) == 0 {
                        continue;
                    }
                    // One glyph bit becomes a scale x scale block.
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let x = pen_x + column as u32 * scale + dx;
                            let y = origin_y + row_index as u32 * scale + dy;
                            if x < width && y < height {
                                image.put_pixel(x, y, FOREGROUND);
                            }
                        }
                    }
                }
            }
        }
        pen_x = pen_x.saturating_add(advance);
    }
}

/// Caption text: `position / duration`, or just `position` when the
/// duration is unknown.
fn format_caption(position: Option<Duration>, duration: Option<Duration>) -> String {
    let position = format_clock(position.unwrap_or_default());
    match duration {
        Some(total) => format!("{position} / {}", format_clock(total)),
        None => position,
    }
}

/// Format a duration as `M:SS` (minutes unbounded).
fn format_clock(value: Duration) -> String {
    let seconds = value.as_secs();
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

fn channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;

/// 5×7 bitmap glyphs for the caption alphabet (digits, `:`, `/`, space).
/// Each row is 5 bits, most significant bit leftmost.
fn glyph(character: char) -> Option<[u8; GLYPH_HEIGHT]> {
    Some(match character {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b00100, 0b00100, 0b00000, 0b00100, 0b00100, 0b00000],
        '/' => [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
        ' ' => [0; GLYPH_HEIGHT],
        _ => return None,
    })
}
