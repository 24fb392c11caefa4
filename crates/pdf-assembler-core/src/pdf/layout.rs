//! Scale-to-fit placement of an image on a page.
//!
//! All values share one unit (millimetres throughout this crate). The origin
//! is the top-left corner of the page; callers writing PDF content streams
//! flip the Y axis themselves.

use serde::{Deserialize, Serialize};

/// 72 points per inch, 25.4 mm per inch.
const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// Placement of an image on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
}

/// Page dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub const fn a4() -> Self {
        Self::new(210.0, 297.0)
    }

    pub const fn letter() -> Self {
        Self::new(215.9, 279.4)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "a4" => Some(Self::a4()),
            "letter" | "us-letter" | "us_letter" => Some(Self::letter()),
            _ => None,
        }
    }

    /// Width in PDF points
    pub fn width_pt(&self) -> f64 {
        mm_to_pt(self.width)
    }

    /// Height in PDF points
    pub fn height_pt(&self) -> f64 {
        mm_to_pt(self.height)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::a4()
    }
}

/// Convert millimetres to PDF points.
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

/// Fit an `img_w` x `img_h` image inside a page with `margin` on every side,
/// preserving aspect ratio and centering the result.
///
/// Width is tried first; if the resulting height overflows the printable
/// area the image is fitted by height instead. Image dimensions must be
/// positive.
pub fn fit_to_page(img_w: f64, img_h: f64, page_w: f64, page_h: f64, margin: f64) -> PageLayout {
    let avail_w = page_w - 2.0 * margin;
    let avail_h = page_h - 2.0 * margin;

    let mut width = avail_w;
    let mut height = img_h * width / img_w;

    if height > avail_h {
        height = avail_h;
        width = img_w * height / img_h;
    }

    PageLayout {
        width,
        height,
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_wide_image_is_width_constrained() {
        let layout = fit_to_page(800.0, 400.0, 210.0, 297.0, 10.0);
        assert_close(layout.width, 190.0);
        assert_close(layout.height, 95.0);
        assert_close(layout.x, 10.0);
        assert_close(layout.y, 101.0);
    }

    #[test]
    fn test_tall_image_is_height_constrained() {
        let layout = fit_to_page(400.0, 1600.0, 210.0, 297.0, 10.0);
        assert_close(layout.height, 277.0);
        assert_close(layout.width, 69.25);
        assert_close(layout.y, 10.0);
        assert_close(layout.x, (210.0 - 69.25) / 2.0);
    }

    #[test]
    fn test_small_image_is_scaled_up() {
        let layout = fit_to_page(10.0, 10.0, 210.0, 297.0, 10.0);
        assert_close(layout.width, 190.0);
        assert_close(layout.height, 190.0);
    }

    #[test]
    fn test_fits_and_preserves_aspect_ratio() {
        let pages = [(210.0, 297.0, 10.0), (297.0, 210.0, 5.0), (215.9, 279.4, 25.0)];
        let images = [(1.0, 1.0), (4000.0, 3000.0), (3000.0, 4000.0), (7.0, 1900.0), (1920.0, 3.0)];

        for &(page_w, page_h, margin) in &pages {
            for &(img_w, img_h) in &images {
                let layout = fit_to_page(img_w, img_h, page_w, page_h, margin);
                assert!(layout.width <= page_w && layout.height <= page_h);
                assert!(layout.x >= 0.0 && layout.y >= 0.0);

                let expected = img_w / img_h;
                let actual = layout.width / layout.height;
                assert!(((actual - expected) / expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_page_size_points() {
        let a4 = PageSize::a4();
        assert!((a4.width_pt() - 595.28).abs() < 0.01);
        assert!((a4.height_pt() - 841.89).abs() < 0.01);
        assert_eq!(PageSize::from_name("Letter"), Some(PageSize::letter()));
        assert_eq!(PageSize::from_name("legal"), None);
    }
}
