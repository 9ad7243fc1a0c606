use image::RgbaImage;

use super::bbox::{BBox, bounds_of};
use crate::error::{Error, Result};

const CHANNELS: usize = 4;

/// Copy the pixels inside `bbox` out of a tightly packed RGBA8 buffer that is
/// `width` pixels wide.
///
/// The result is a new zero-initialised image whose rows are packed back to
/// back with no stride left over from the source. Boxes that reach past the
/// source buffer, or whose edges are inverted, are rejected.
pub fn extract(pixels: &[u8], width: u32, bbox: &BBox) -> Result<RgbaImage> {
    let stride = width as usize * CHANNELS;
    let source_height = if stride == 0 { 0 } else { pixels.len() / stride };

    let fits = bbox.left <= bbox.right
        && bbox.top <= bbox.bottom
        && bbox.right < width
        && (bbox.bottom as usize) < source_height;
    if !fits {
        return Err(Error::BoundsOutsideSource {
            bbox: *bbox,
            width,
            height: source_height as u32,
        });
    }

    let mut trimmed = RgbaImage::new(bbox.width(), bbox.height());
    let row_len = bbox.width() as usize * CHANNELS;
    let left = bbox.left as usize * CHANNELS;

    for (dst_row, y) in trimmed
        .chunks_exact_mut(row_len)
        .zip(bbox.top as usize..=bbox.bottom as usize)
    {
        let src_index = y * stride + left;
        dst_row.copy_from_slice(&pixels[src_index..src_index + row_len]);
    }

    Ok(trimmed)
}

/// Crop `image` to its non-transparent region, returning the box that was
/// kept alongside the cropped copy.
pub fn trim(image: &RgbaImage) -> Result<(BBox, RgbaImage)> {
    let bbox = bounds_of(image).ok_or(Error::EmptyImage)?;
    let trimmed = extract(image.as_raw(), image.width(), &bbox)?;
    Ok((bbox, trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trim::find_opaque_bounds;
    use image::Rgba;

    /// A `width` x `height` buffer where every byte is distinct enough to spot
    /// misplaced rows: pixel (x, y) is `[x, y, x ^ y, alpha]`.
    fn patterned(width: u32, height: u32, alpha: impl Fn(u32, u32) -> u8) -> Vec<u8> {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, (x ^ y) as u8, alpha(x, y)]);
            }
        }
        pixels
    }

    #[test]
    fn single_pixel_is_copied_verbatim() {
        let pixels = patterned(4, 4, |x, y| if (x, y) == (1, 1) { 255 } else { 0 });
        let bbox = find_opaque_bounds(&pixels, 4, 4).unwrap();

        let trimmed = extract(&pixels, 4, &bbox).unwrap();

        assert_eq!(trimmed.dimensions(), (1, 1));
        assert_eq!(trimmed.as_raw().as_slice(), &[1, 1, 0, 255]);
    }

    #[test]
    fn block_rows_are_repacked() {
        let inside = |x: u32, y: u32| (1..=2).contains(&x) && (1..=2).contains(&y);
        let pixels = patterned(4, 4, |x, y| if inside(x, y) { 200 } else { 0 });
        let bbox = find_opaque_bounds(&pixels, 4, 4).unwrap();
        assert_eq!(
            bbox,
            BBox {
                left: 1,
                top: 1,
                right: 2,
                bottom: 2
            }
        );

        let trimmed = extract(&pixels, 4, &bbox).unwrap();

        assert_eq!(trimmed.dimensions(), (2, 2));
        assert_eq!(
            trimmed.as_raw().as_slice(),
            &[
                1, 1, 0, 200, 2, 1, 3, 200, //
                1, 2, 3, 200, 2, 2, 0, 200,
            ]
        );
    }

    #[test]
    fn transparent_pixels_inside_box_are_kept() {
        // opaque corners only, the transparent middle must still be copied
        let pixels = patterned(5, 5, |x, y| if (x, y) == (1, 1) || (x, y) == (3, 3) { 9 } else { 0 });
        let bbox = find_opaque_bounds(&pixels, 5, 5).unwrap();

        let trimmed = extract(&pixels, 5, &bbox).unwrap();

        assert_eq!(trimmed.dimensions(), (3, 3));
        assert_eq!(trimmed.get_pixel(1, 1), &Rgba([2, 2, 0, 0]));
        assert_eq!(trimmed.get_pixel(2, 2), &Rgba([3, 3, 0, 9]));
    }

    #[test]
    fn dimensions_follow_the_box() {
        let pixels = patterned(8, 6, |_, _| 255);
        let bbox = BBox {
            left: 2,
            top: 1,
            right: 6,
            bottom: 3,
        };

        let trimmed = extract(&pixels, 8, &bbox).unwrap();

        assert_eq!(trimmed.dimensions(), (5, 3));
        assert_eq!(trimmed.get_pixel(0, 0), &Rgba([2, 1, 3, 255]));
        assert_eq!(trimmed.get_pixel(4, 2), &Rgba([6, 3, 5, 255]));
    }

    #[test]
    fn full_box_round_trips() {
        let pixels = patterned(7, 3, |x, y| (x * 30 + y) as u8);

        let trimmed = extract(&pixels, 7, &BBox::full(7, 3)).unwrap();

        assert_eq!(trimmed.into_raw(), pixels);
    }

    #[test]
    fn trimming_twice_changes_nothing() {
        let pixels = patterned(6, 6, |x, y| if (1..5).contains(&x) && (2..4).contains(&y) { 1 } else { 0 });
        let image = RgbaImage::from_raw(6, 6, pixels).unwrap();

        let (first_box, once) = trim(&image).unwrap();
        let (second_box, twice) = trim(&once).unwrap();

        assert_eq!((first_box.width(), first_box.height()), (4, 2));
        assert_eq!(second_box, BBox::full(once.width(), once.height()));
        assert_eq!(once, twice);
    }

    #[test]
    fn fully_transparent_image_does_not_trim() {
        let image = RgbaImage::new(3, 3);
        assert!(matches!(trim(&image), Err(Error::EmptyImage)));
    }

    #[test]
    fn box_outside_source_is_rejected() {
        let pixels = patterned(4, 4, |_, _| 255);

        let too_wide = BBox {
            left: 0,
            top: 0,
            right: 4,
            bottom: 0,
        };
        let too_tall = BBox {
            left: 0,
            top: 3,
            right: 0,
            bottom: 4,
        };
        let inverted = BBox {
            left: 3,
            top: 0,
            right: 1,
            bottom: 0,
        };

        for bbox in [too_wide, too_tall, inverted] {
            assert!(matches!(
                extract(&pixels, 4, &bbox),
                Err(Error::BoundsOutsideSource { .. })
            ));
        }
    }
}
