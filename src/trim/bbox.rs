use image::RgbaImage;

/// Edges of a rectangle inside an RGBA8 buffer. All four are pixel indices
/// that belong to the rectangle, so a single pixel has `left == right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BBox {
    #[cfg(test)]
    pub(crate) fn full(width: u32, height: u32) -> Self {
        BBox {
            left: 0,
            top: 0,
            right: width - 1,
            bottom: height - 1,
        }
    }

    fn point(x: u32, y: u32) -> Self {
        BBox {
            left: x,
            top: y,
            right: x,
            bottom: y,
        }
    }

    fn include(self, x: u32, y: u32) -> Self {
        BBox {
            left: self.left.min(x),
            top: self.top.min(y),
            right: self.right.max(x),
            bottom: self.bottom.max(y),
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }
}

/// Fold the coordinates of every pixel whose alpha byte is non-zero into the
/// smallest [`BBox`] around them. `pixels` is row-major, `width * 4` bytes
/// per row.
///
/// Returns `None` if the image is fully transparent or has no pixels at all.
/// Bytes past `width * height` pixels are ignored.
pub fn find_opaque_bounds(pixels: &[u8], width: u32, height: u32) -> Option<BBox> {
    if width == 0 || height == 0 {
        return None;
    }

    let row = width as usize;
    let pixel_count = row * height as usize;

    pixels
        .chunks_exact(4)
        .take(pixel_count)
        .enumerate()
        .filter(|(_, pixel)| pixel[3] != 0)
        .map(|(i, _)| ((i % row) as u32, (i / row) as u32))
        .fold(None, |bounds, (x, y)| match bounds {
            None => Some(BBox::point(x, y)),
            Some(bbox) => Some(bbox.include(x, y)),
        })
}

/// [`find_opaque_bounds`] over a decoded image.
pub fn bounds_of(image: &RgbaImage) -> Option<BBox> {
    find_opaque_bounds(image.as_raw(), image.width(), image.height())
}
