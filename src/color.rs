use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

use crate::data::model::Gender;

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            to_color32(hsl.into_color())
        })
        .collect()
}

/// Fixed colour per gender so stacked bars keep their legend across redraws.
pub fn gender_color(gender: Gender) -> Color32 {
    let palette = generate_palette(Gender::ALL.len());
    let idx = Gender::ALL.iter().position(|g| *g == gender).unwrap_or(0);
    palette[idx]
}

// ---------------------------------------------------------------------------
// Heatmap ramp
// ---------------------------------------------------------------------------

/// Colour for `value` on a pale-yellow → deep-red ramp scaled to `max`.
pub fn heat_color(value: f64, max: f64) -> Color32 {
    let t = if max > 0.0 { (value / max).clamp(0.0, 1.0) as f32 } else { 0.0 };
    let low: Hsl = Hsl::new(55.0, 0.9, 0.92);
    let high: Hsl = Hsl::new(5.0, 0.8, 0.35);
    to_color32(low.mix(high, t).into_color())
}

/// Readable text colour on top of a heat cell.
pub fn heat_text_color(value: f64, max: f64) -> Color32 {
    if max > 0.0 && value / max > 0.55 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}
