//! PNG export of heightmaps and occupancy layers for quick inspection.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::grid::Grid;
use crate::world::OccupancyLayer;

/// Export a heightmap as a PNG with a simple elevation ramp: blue below
/// sea level, green through brown to white above.
pub fn export_heightmap(
    heights: &Grid<f32>,
    sea_level: f32,
    path: &str,
) -> Result<(), image::ImageError> {
    let img = render_heightmap(heights, sea_level);
    img.save(path)
}

/// Export a heightmap with layer points drawn on top.
pub fn export_with_layers(
    heights: &Grid<f32>,
    sea_level: f32,
    layers: &[OccupancyLayer],
    path: &str,
) -> Result<(), image::ImageError> {
    let mut img = render_heightmap(heights, sea_level);
    let (img_w, img_h) = (img.width() as usize, img.height() as usize);

    // Layer colors cycle; layer grids may be coarser or finer than the map.
    const COLORS: [Rgb<u8>; 4] = [
        Rgb([20, 90, 20]),
        Rgb([180, 40, 40]),
        Rgb([220, 200, 60]),
        Rgb([150, 60, 180]),
    ];

    for (i, layer) in layers.iter().enumerate() {
        let color = COLORS[i % COLORS.len()];
        if layer.cells.is_empty() {
            continue;
        }
        let sx = img_w as f32 / layer.cells.width as f32;
        let sy = img_h as f32 / layer.cells.height as f32;
        for (x, y, &occupied) in layer.cells.iter() {
            if !occupied {
                continue;
            }
            let px = ((x as f32 + 0.5) * sx) as u32;
            let py = ((y as f32 + 0.5) * sy) as u32;
            if px < img.width() && py < img.height() {
                img.put_pixel(px, py, color);
            }
        }
    }

    img.save(path)
}

fn render_heightmap(heights: &Grid<f32>, sea_level: f32) -> RgbImage {
    let width = heights.width.max(1) as u32;
    let height = heights.height.max(1) as u32;

    ImageBuffer::from_fn(width, height, |x, y| {
        if heights.is_empty() {
            return Rgb([0u8, 0, 0]);
        }
        let h = *heights.get(x as usize, y as usize);

        if h < sea_level {
            // Water: deeper is darker.
            let depth = ((sea_level - h) / sea_level.max(f32::MIN_POSITIVE)).clamp(0.0, 1.0);
            let blue = (200.0 - 120.0 * depth) as u8;
            Rgb([20, 50, blue])
        } else {
            let land = ((h - sea_level) / (1.0 - sea_level).max(f32::MIN_POSITIVE)).clamp(0.0, 1.0);
            if land < 0.4 {
                let t = land / 0.4;
                Rgb([
                    (60.0 + 90.0 * t) as u8,
                    (140.0 + 40.0 * t) as u8,
                    (60.0 - 20.0 * t) as u8,
                ])
            } else if land < 0.8 {
                let t = (land - 0.4) / 0.4;
                Rgb([
                    (150.0 + 20.0 * t) as u8,
                    (180.0 - 80.0 * t) as u8,
                    (40.0 + 40.0 * t) as u8,
                ])
            } else {
                let t = (land - 0.8) / 0.2;
                let c = (170.0 + 85.0 * t) as u8;
                Rgb([c, c, c])
            }
        }
    })
}
