//! Speed to color mapping for the heatmap renderer.
//!
//! Speeds (position units per second) map to an OKLCH triple plus alpha via
//! fixed piecewise-linear ramps, then to sRGB through Björn Ottosson's
//! OKLab transform (<https://bottosson.github.io/posts/oklab/>).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::util::clamplerp;

// Lightness and chroma fall off at high speeds, hue sweeps from cyan
// towards red as speed rises, alpha fades in over the first 100 u/s.
const L_RAMP: (f64, f64, f64, f64) = (500.0, 600.0, 0.8, 0.4);
const C_RAMP: (f64, f64, f64, f64) = (800.0, 900.0, 0.4, 0.1);
const H_OFFSET: f64 = 210.0;
const H_SPEED: f64 = -2.4;
const A_RAMP: (f64, f64, f64, f64) = (0.0, 100.0, 0.0, 1.0);

/// Maps an absolute speed to `(lightness, chroma, hue, alpha)`.
pub fn speed_to_oklch(speed: f64) -> (f64, f64, f64, f64) {
  let roll = |value: f64, cap: f64| ((value % cap) + cap) % cap;

  let l = clamplerp(speed, L_RAMP.0, L_RAMP.1, L_RAMP.2, L_RAMP.3);
  let c = clamplerp(speed, C_RAMP.0, C_RAMP.1, C_RAMP.2, C_RAMP.3);
  let h = roll(H_OFFSET + speed / H_SPEED, 360.0);
  let a = clamplerp(speed, A_RAMP.0, A_RAMP.1, A_RAMP.2, A_RAMP.3);

  (l, c, h, a)
}

/// OKLCH to 8-bit sRGB.
pub fn oklch_to_rgb(lightness: f64, chroma: f64, hue: f64) -> (u8, u8, u8) {
  let h_rad = hue.to_radians();
  let a = chroma * h_rad.cos();
  let b = chroma * h_rad.sin();

  // OKLab to LMS cone space
  let l_ = lightness + 0.3963377774 * a + 0.2158037573 * b;
  let m_ = lightness - 0.1055613458 * a - 0.0638541728 * b;
  let s_ = lightness - 0.0894841775 * a - 1.2914855480 * b;

  let l3 = l_ * l_ * l_;
  let m3 = m_ * m_ * m_;
  let s3 = s_ * s_ * s_;

  let r = 4.0767416621 * l3 - 3.3077115913 * m3 + 0.2309699292 * s3;
  let g = -1.2684380046 * l3 + 2.6097574011 * m3 - 0.3413193965 * s3;
  let b = -0.0041960863 * l3 - 0.7034186147 * m3 + 1.7076147010 * s3;

  (linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b))
}

fn linear_to_srgb(c: f64) -> u8 {
  let c = if c <= 0.0031308 {
    12.92 * c
  } else {
    1.055 * c.powf(1.0 / 2.4) - 0.055
  };
  (c * 255.0).round().max(0.0).min(255.0) as u8
}

/// Lowercase 6-digit hex for an absolute speed (alpha is not encoded).
pub fn speed_to_hex(speed: f64) -> String {
  let (l, c, h, _) = speed_to_oklch(speed);
  let (r, g, b) = oklch_to_rgb(l, c, h);
  format!("#{r:02x}{g:02x}{b:02x}")
}

static HEX_CACHE: Lazy<Mutex<HashMap<i64, String>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Memoized [`speed_to_hex`], keyed by the rounded absolute speed.
///
/// The cache is the only process-wide state in the crate; renderers hit the
/// same few hundred integer speeds over and over.
pub fn speed_to_hex_cached(speed: f64) -> String {
  let key = speed.abs().round() as i64;
  let mut cache = HEX_CACHE.lock();
  cache
    .entry(key)
    .or_insert_with(|| speed_to_hex(key as f64))
    .clone()
}

/// CSS `oklch(...)` text for a speed, optionally with alpha.
pub fn speed_to_oklch_text(speed: f64, use_alpha: bool) -> String {
  let (l, c, h, a) = speed_to_oklch(speed);

  let alpha = if use_alpha {
    format!(" / {}", trim_fixed(a, 3))
  } else {
    String::new()
  };
  format!(
    "oklch({}% {} {}{alpha})",
    trim_fixed(l * 100.0, 3),
    trim_fixed(c, 3),
    trim_fixed(h, 1)
  )
}

fn trim_fixed(value: f64, precision: usize) -> String {
  let mut s = format!("{value:.precision$}");
  if s.contains('.') {
    while s.ends_with('0') {
      s.pop();
    }
    if s.ends_with('.') {
      s.pop();
    }
  }
  s
}
