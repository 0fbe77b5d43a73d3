// ─────────────────────────────────────────────────────────────────────
// Plumbline: Window Detection Interface
// ─────────────────────────────────────────────────────────────────────
//! Window counting on elevation renders.
//!
//! The default detector is a heuristic proxy, not object detection:
//! it flood-fills connected edge regions and converts their total area
//! into a window count. Callers with a real detector plug it in through
//! [`WindowDetector`].

use image::DynamicImage;

use super::edges::EdgeMask;

/// Result of a window detection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowDetection {
    pub detected: u32,
    /// Connected regions found; 0 when the detector does not report them.
    pub regions: u32,
}

/// Trait for window detectors.
pub trait WindowDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage, edges: &EdgeMask) -> WindowDetection;
}

/// 4-connected flood fill over the edge mask.
///
/// `detected = round(total region area / pixels_per_window)`.
pub struct FloodFillDetector {
    pixels_per_window: f64,
}

impl FloodFillDetector {
    pub fn new(pixels_per_window: f64) -> Self {
        Self { pixels_per_window }
    }
}

impl Default for FloodFillDetector {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl WindowDetector for FloodFillDetector {
    fn detect(&self, _image: &DynamicImage, edges: &EdgeMask) -> WindowDetection {
        let (w, h) = (edges.width(), edges.height());
        let mut visited = vec![false; w as usize * h as usize];
        let idx = |x: u32, y: u32| y as usize * w as usize + x as usize;

        let mut regions = 0u32;
        let mut total_area = 0usize;
        let mut stack: Vec<(u32, u32)> = Vec::new();

        for y in 0..h {
            for x in 0..w {
                if visited[idx(x, y)] || !edges.get(x, y) {
                    continue;
                }
                regions += 1;
                visited[idx(x, y)] = true;
                stack.push((x, y));
                while let Some((cx, cy)) = stack.pop() {
                    total_area += 1;
                    let neighbours = [
                        (cx.wrapping_sub(1), cy),
                        (cx + 1, cy),
                        (cx, cy.wrapping_sub(1)),
                        (cx, cy + 1),
                    ];
                    for (nx, ny) in neighbours {
                        if nx < w && ny < h && !visited[idx(nx, ny)] && edges.get(nx, ny) {
                            visited[idx(nx, ny)] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }
        }

        let detected = if self.pixels_per_window > 0.0 {
            (total_area as f64 / self.pixels_per_window).round() as u32
        } else {
            0
        };
        log::debug!("flood fill: {regions} region(s), {total_area} px, {detected} window(s)");
        WindowDetection { detected, regions }
    }
}

type DetectFn = Box<dyn Fn(&DynamicImage) -> u32 + Send + Sync>;

/// Detector that delegates counting to a caller-supplied function.
pub struct ExternalWindowDetector {
    detect_fn: DetectFn,
}

impl ExternalWindowDetector {
    pub fn new(detect_fn: impl Fn(&DynamicImage) -> u32 + Send + Sync + 'static) -> Self {
        Self {
            detect_fn: Box::new(detect_fn),
        }
    }
}

impl WindowDetector for ExternalWindowDetector {
    fn detect(&self, image: &DynamicImage, _edges: &EdgeMask) -> WindowDetection {
        WindowDetection {
            detected: (self.detect_fn)(image),
            regions: 0,
        }
    }
}
