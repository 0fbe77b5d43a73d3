// ─────────────────────────────────────────────────────────────────────
// Plumbline: Edge Detection and Alignment
// ─────────────────────────────────────────────────────────────────────
//! Sobel edge masks, exact edge IoU, and tolerant edge alignment.
//!
//! Grayscale uses ITU-R 601 luminance (0.299 R + 0.587 G + 0.114 B).
//! Gradients are computed with the 3×3 Sobel operator on interior
//! pixels only; border pixels are never edges.

use image::DynamicImage;
use plumbline_types::EdgeAlignment;

/// Binary edge mask in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl EdgeMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    #[inline]
    fn idx(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let i = self.idx(x, y);
        self.bits[i] = value;
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn same_size(&self, other: &EdgeMask) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Sobel edge mask: gradient magnitude strictly above `threshold`.
    pub fn from_image(img: &DynamicImage, threshold: f64) -> Self {
        let (w, h) = (img.width(), img.height());
        let gray = luminance(img);
        let mut mask = EdgeMask::new(w, h);
        if w < 3 || h < 3 {
            return mask;
        }
        let at = |x: u32, y: u32| gray[y as usize * w as usize + x as usize];

        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let gx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
                let gy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
                if (gx * gx + gy * gy).sqrt() > threshold {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Dilate with a disc of the given pixel radius.
    pub fn dilate(&self, radius: u32) -> Self {
        if radius == 0 {
            return self.clone();
        }
        let r = radius as i64;
        let offsets: Vec<(i64, i64)> = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(|(dx, dy)| dx * dx + dy * dy <= r * r)
            .collect();

        let (w, h) = (self.width as i64, self.height as i64);
        let mut out = EdgeMask::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.get(x, y) {
                    continue;
                }
                for &(dx, dy) in &offsets {
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if nx >= 0 && ny >= 0 && nx < w && ny < h {
                        out.set(nx as u32, ny as u32, true);
                    }
                }
            }
        }
        out
    }

    fn overlap_count(&self, other: &EdgeMask) -> usize {
        self.bits
            .iter()
            .zip(&other.bits)
            .filter(|(&a, &b)| a && b)
            .count()
    }
}

/// Per-pixel luminance, row-major.
pub fn luminance(img: &DynamicImage) -> Vec<f64> {
    img.to_rgb8()
        .pixels()
        .map(|p| 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64)
        .collect()
}

/// Intersection over union of two masks.
///
/// Masks of different size score 0. Two empty masks are identical and
/// score 1.
pub fn edge_iou(a: &EdgeMask, b: &EdgeMask) -> f64 {
    if !a.same_size(b) {
        log::warn!(
            "edge_iou: mask size mismatch {}x{} vs {}x{}",
            a.width,
            a.height,
            b.width,
            b.height
        );
        return 0.0;
    }
    let mut intersection = 0usize;
    let mut union = 0usize;
    for (&p, &q) in a.bits.iter().zip(&b.bits) {
        intersection += (p && q) as usize;
        union += (p || q) as usize;
    }
    if union == 0 {
        return 1.0;
    }
    intersection as f64 / union as f64
}

/// Precision/recall/F1 of generated edges against reference edges,
/// counting an edge as matched when the other mask has an edge within
/// `tolerance_px`.
pub fn edge_alignment(reference: &EdgeMask, generated: &EdgeMask, tolerance_px: u32) -> EdgeAlignment {
    if !reference.same_size(generated) {
        return EdgeAlignment::default();
    }
    let ref_count = reference.count();
    let gen_count = generated.count();
    if ref_count == 0 && gen_count == 0 {
        return EdgeAlignment {
            precision: 1.0,
            recall: 1.0,
            f1: 1.0,
        };
    }

    let ref_dilated = reference.dilate(tolerance_px);
    let gen_dilated = generated.dilate(tolerance_px);
    let precision = generated.overlap_count(&ref_dilated) as f64 / gen_count.max(1) as f64;
    let recall = reference.overlap_count(&gen_dilated) as f64 / ref_count.max(1) as f64;
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    EdgeAlignment {
        precision,
        recall,
        f1,
    }
}
