use image::{Rgb, RgbaImage};

/// Colour every icon is drawn in before it is tinted.
pub const ICON_BASE_COLOUR: Rgb<u8> = Rgb([250, 253, 255]);

/// Returns a copy of `image` where every pixel whose RGB equals `from` takes
/// the RGB of `to`. Matching is exact; alpha is never touched.
pub fn recolor(image: &RgbaImage, from: Rgb<u8>, to: Rgb<u8>) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        if pixel.0[..3] == from.0 {
            pixel.0[..3].copy_from_slice(&to.0);
        }
    }
    out
}
