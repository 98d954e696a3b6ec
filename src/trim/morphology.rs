//! Morphological closing with a rectangular structuring element
//!
//! Closing (dilate, then erode with the same element) bridges thin paper gaps
//! between neighbouring ink fragments, e.g. a panel border and a balloon
//! drawn a few pixels away, without growing large shapes.
//!
//! The element is anchored at `(width / 2, height / 2)`. Pixels outside the
//! image never dilate into it and never erode its border.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

use super::binarize::{INK, PAPER};

/// Close small gaps in an ink mask.
///
/// `kernel` is `(width, height)` of the rectangular element. Odd square
/// elements go through `imageproc`'s L-infinity morphology; any other
/// rectangle uses a separable window filter with the same semantics.
pub fn close(mask: &GrayImage, kernel: (u32, u32)) -> GrayImage {
    let (kw, kh) = kernel;
    if kw <= 1 && kh <= 1 {
        return mask.clone();
    }

    if kw == kh && kw % 2 == 1 {
        if let Ok(radius) = u8::try_from(kw / 2) {
            let dilated = dilate(mask, Norm::LInf, radius);
            return erode(&dilated, Norm::LInf, radius);
        }
    }

    let dilated = rect_filter(mask, kernel, Op::Dilate);
    rect_filter(&dilated, kernel, Op::Erode)
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Dilate,
    Erode,
}

/// Separable rectangular dilation/erosion over a 0/255 mask
fn rect_filter(mask: &GrayImage, (kw, kh): (u32, u32), op: Op) -> GrayImage {
    let (width, height) = mask.dimensions();
    let kw = kw.max(1) as usize;
    let kh = kh.max(1) as usize;
    let w = width as usize;
    let h = height as usize;

    let src: Vec<bool> = mask.pixels().map(|p| p.0[0] > 0).collect();

    // Horizontal pass
    let mut rows = vec![false; w * h];
    for y in 0..h {
        let line = &src[y * w..(y + 1) * w];
        let filtered = filter_line(line, kw, op);
        rows[y * w..(y + 1) * w].copy_from_slice(&filtered);
    }

    // Vertical pass
    let mut out = vec![false; w * h];
    let mut column = vec![false; h];
    for x in 0..w {
        for y in 0..h {
            column[y] = rows[y * w + x];
        }
        let filtered = filter_line(&column, kh, op);
        for y in 0..h {
            out[y * w + x] = filtered[y];
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        if out[y as usize * w + x as usize] {
            Luma([INK])
        } else {
            Luma([PAPER])
        }
    })
}

/// 1-D window filter. Window for index `i` is `[i - k/2, i - k/2 + k - 1]`,
/// clipped to the line.
fn filter_line(line: &[bool], k: usize, op: Op) -> Vec<bool> {
    let n = line.len();
    let anchor = k / 2;

    let mut prefix = vec![0usize; n + 1];
    for (i, &v) in line.iter().enumerate() {
        prefix[i + 1] = prefix[i] + usize::from(v);
    }

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(anchor);
            let end = (i + k - anchor).min(n);
            let ink = prefix[end] - prefix[start];
            match op {
                Op::Dilate => ink > 0,
                Op::Erode => ink == end - start,
            }
        })
        .collect()
}
