//! Marker overlays for `image::RgbImage`.

use crate::Marker;
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use nalgebra::Point2;

pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

/// Outline thickness for an image `width` pixels wide: `width / 500`,
/// clamped to `[1, 5]`.
pub fn line_width(width: u32) -> u32 {
    (width as f32 / 500.0).round().clamp(1.0, 5.0) as u32
}

/// Draw `marker` onto `image`.
///
/// The outline uses `color`. Corner 0 gets a filled red square, corner 1 a
/// hollow green one and corner 2 a hollow blue one, so the marker's
/// canonical orientation is visible.
pub fn draw_marker(image: &mut RgbImage, marker: &Marker, color: Rgb<u8>) {
    let lw = line_width(image.width());
    for i in 0..4 {
        let a = marker.corners[i];
        let b = marker.corners[(i + 1) % 4];
        draw_thick_segment(image, a, b, lw, color);
    }

    let half = 2 * lw;
    draw_filled_rect_mut(image, corner_box(marker.corners[0], half), RED);
    draw_thick_box(image, marker.corners[1], half, lw, GREEN);
    draw_thick_box(image, marker.corners[2], half, lw, BLUE);
}

/// Draw every marker with the same outline color.
pub fn draw_markers(image: &mut RgbImage, markers: &[Marker], color: Rgb<u8>) {
    for marker in markers {
        draw_marker(image, marker, color);
    }
}

fn corner_box(center: Point2<f32>, half: u32) -> Rect {
    let x = center.x.round() as i32 - half as i32;
    let y = center.y.round() as i32 - half as i32;
    Rect::at(x, y).of_size(2 * half, 2 * half)
}

/// Hollow box with `lw` pixel thick walls, growing inwards.
fn draw_thick_box(image: &mut RgbImage, center: Point2<f32>, half: u32, lw: u32, color: Rgb<u8>) {
    for k in 0..lw.min(half) {
        draw_hollow_rect_mut(image, corner_box(center, half - k), color);
    }
}

fn draw_thick_segment(
    image: &mut RgbImage,
    a: Point2<f32>,
    b: Point2<f32>,
    lw: u32,
    color: Rgb<u8>,
) {
    let d = b - a;
    let len = d.norm();
    if lw <= 1 || len < 1.0 {
        draw_line_segment_mut(image, (a.x, a.y), (b.x, b.y), color);
        return;
    }

    let hw = lw as f32 * 0.5;
    let nx = -d.y / len * hw;
    let ny = d.x / len * hw;
    let to_px = |x: f32, y: f32| Point::new(x.round() as i32, y.round() as i32);
    let poly = [
        to_px(a.x + nx, a.y + ny),
        to_px(b.x + nx, b.y + ny),
        to_px(b.x - nx, b.y - ny),
        to_px(a.x - nx, a.y - ny),
    ];
    if poly[0] == poly[3] {
        draw_line_segment_mut(image, (a.x, a.y), (b.x, b.y), color);
        return;
    }
    draw_polygon_mut(image, &poly, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_marker() -> Marker {
        Marker {
            id: 1,
            corners: [
                Point2::new(20.0, 20.0),
                Point2::new(80.0, 20.0),
                Point2::new(80.0, 80.0),
                Point2::new(20.0, 80.0),
            ],
            rotation: 0,
        }
    }

    #[test]
    fn line_width_is_clamped() {
        assert_eq!(line_width(100), 1);
        assert_eq!(line_width(1000), 2);
        assert_eq!(line_width(1500), 3);
        assert_eq!(line_width(10_000), 5);
    }

    #[test]
    fn corners_are_color_coded() {
        let mut img = RgbImage::new(100, 100);
        draw_marker(&mut img, &sample_marker(), Rgb([255, 255, 0]));

        // lw = 1, so the corner boxes span 4 px around each corner.
        assert_eq!(*img.get_pixel(20, 20), RED);
        assert_eq!(*img.get_pixel(19, 19), RED);
        assert_eq!(*img.get_pixel(78, 18), GREEN);
        assert_eq!(*img.get_pixel(78, 78), BLUE);
        // Hollow boxes leave their interior alone.
        assert_eq!(*img.get_pixel(79, 19), Rgb([0, 0, 0]));
        // Outline between corners 2 and 3.
        assert_eq!(*img.get_pixel(50, 80), Rgb([255, 255, 0]));
        // Marker interior is untouched.
        assert_eq!(*img.get_pixel(50, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn corner_boxes_thicken_with_the_image() {
        let mut img = RgbImage::new(1000, 120);
        draw_marker(&mut img, &sample_marker(), Rgb([255, 255, 0]));

        // lw = 2: the green box spans [76, 84) with 2 px walls.
        assert_eq!(*img.get_pixel(76, 16), GREEN);
        assert_eq!(*img.get_pixel(77, 17), GREEN);
        assert_eq!(*img.get_pixel(78, 17), GREEN);
        assert_eq!(*img.get_pixel(76, 82), BLUE);
        assert_eq!(*img.get_pixel(77, 81), BLUE);
        assert_eq!(*img.get_pixel(83, 83), BLUE);
        assert_eq!(*img.get_pixel(82, 82), BLUE);
        // Inside the walls the canvas shows through.
        assert_eq!(*img.get_pixel(78, 18), Rgb([0, 0, 0]));
    }

    #[test]
    fn markers_off_canvas_do_not_panic() {
        let mut img = RgbImage::new(10, 10);
        let mut marker = sample_marker();
        marker.corners[1] = Point2::new(-40.0, 500.0);
        draw_markers(&mut img, &[marker], RED);
    }
}
