//! Debug visualization of generated fields
//!
//! Dumps heightfields to PNG so generation parameters can be inspected
//! before a slab string is pasted anywhere. Not part of the wire contract.

use image::{ImageBuffer, Luma, Rgb, RgbImage};

use crate::heightfield::Heightfield;

/// Export a heightfield using a spectral colormap. Values are normalized
/// to the field's own range first.
pub fn export_heightfield(
    field: &Heightfield,
    path: &str,
) -> Result<(), image::ImageError> {
    let normalized = field.clone().normalized();
    let mut img: RgbImage = ImageBuffer::new(field.width as u32, field.height as u32);

    for y in 0..field.height {
        for x in 0..field.width {
            let val = normalized.get(x, y);
            img.put_pixel(x as u32, y as u32, Rgb(spectral_colormap(val)));
        }
    }

    img.save(path)
}

/// Export a heightfield as 16-bit grayscale, for tools that want raw
/// values rather than a colormap.
pub fn export_heightfield_gray(
    field: &Heightfield,
    path: &str,
) -> Result<(), image::ImageError> {
    let normalized = field.clone().normalized();
    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::new(field.width as u32, field.height as u32);

    for y in 0..field.height {
        for x in 0..field.width {
            let val = (normalized.get(x, y) * f64::from(u16::MAX)) as u16;
            img.put_pixel(x as u32, y as u32, Luma([val]));
        }
    }

    img.save(path)
}

/// Spectral colormap (matplotlib style): dark blue -> teal -> yellow ->
/// orange -> dark red.
fn spectral_colormap(t: f64) -> [u8; 3] {
    let colors: [[f64; 3]; 11] = [
        [0.37, 0.31, 0.64],
        [0.20, 0.53, 0.74],
        [0.40, 0.76, 0.65],
        [0.67, 0.87, 0.64],
        [0.90, 0.96, 0.60],
        [1.00, 1.00, 0.75],
        [1.00, 0.88, 0.55],
        [0.99, 0.68, 0.38],
        [0.96, 0.43, 0.26],
        [0.84, 0.24, 0.31],
        [0.62, 0.00, 0.26],
    ];

    let t_scaled = t.clamp(0.0, 1.0) * 10.0;
    let idx = (t_scaled as usize).min(9);
    let frac = t_scaled - idx as f64;

    let c1 = colors[idx];
    let c2 = colors[idx + 1];

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}
