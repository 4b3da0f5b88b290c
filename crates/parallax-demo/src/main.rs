use image::{Rgba, RgbaImage};

use parallax_effect::HoverReveal;
use parallax_engine::logging::{init_logging, LoggingConfig};

/// Texture resolution; twice the plane's 250x350 logical size.
const TEXTURE_SIZE: (u32, u32) = (500, 700);

/// Base colours of the four link textures.
const PALETTE: [[u8; 3]; 4] = [
    [228, 94, 72],
    [64, 140, 214],
    [238, 186, 64],
    [92, 184, 128],
];

fn main() {
    init_logging(LoggingConfig::default());

    let mut app = HoverReveal::new()
        .title("Parallax Reveal")
        .size(1280.0, 800.0)
        .default_texture(stripes([200, 200, 210], 0));

    for (i, color) in PALETTE.into_iter().enumerate() {
        app = app.link_texture(stripes(color, i as u32 + 1));
    }

    if let Err(e) = app.run() {
        log::error!("parallax demo failed: {e:#}");
        std::process::exit(1);
    }
}

/// Vertical gradient from `color` to black, crossed by diagonal bands whose
/// spacing depends on `seed` so each texture is easy to tell apart.
fn stripes(color: [u8; 3], seed: u32) -> RgbaImage {
    let (w, h) = TEXTURE_SIZE;
    let period = 40 + seed * 16;

    RgbaImage::from_fn(w, h, |x, y| {
        let fade = 1.0 - 0.75 * (y as f32 / h as f32);
        let band = if (x + y) % period < period / 2 { 1.0 } else { 0.8 };
        let [r, g, b] = color.map(|c| (c as f32 * fade * band) as u8);
        Rgba([r, g, b, 255])
    })
}
