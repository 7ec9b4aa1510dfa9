// src/labeling.rs - 4-connected component labeling with area filtering

use std::collections::VecDeque;

use serde::Serialize;

use crate::mask::Mask;

/// 4-connected neighbour offsets
static NEIGHBORHOOD_4: [(i64, i64); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// A connected region kept by the labeler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub id: u32,
    pub area_px: usize,
    pub area_percent: f64,
}

/// Result of a labeling pass
#[derive(Debug, Clone)]
pub struct Labeling {
    /// Per-pixel label, 0 for unlabeled; every discovered component gets an id,
    /// including rejected ones
    pub labels: Vec<u32>,
    /// Kept regions in discovery order
    pub regions: Vec<Region>,
    /// Total number of components discovered
    pub component_count: u32,
}

impl Labeling {
    /// Mask of all pixels belonging to kept regions
    pub fn kept_mask(&self, width: u32, height: u32) -> Mask {
        let mut kept = vec![false; self.component_count as usize + 1];
        for region in &self.regions {
            kept[region.id as usize] = true;
        }
        Mask::from_fn(width, height, |i| kept[self.labels[i] as usize])
    }
}

/// Smallest region area kept by the first labeling pass:
/// `max(min_region_size, max(100, pixels / 1000))`
pub fn min_keep(width: u32, height: u32, min_region_size: u32) -> usize {
    let pixels = width as usize * height as usize;
    (min_region_size as usize).max(100.max(pixels / 1000))
}

/// Breadth-first flood from `start`, writing `label` into `labels`.
/// `visit` sees every pixel of the component; returns its area.
fn flood_fill(
    mask: &Mask,
    labels: &mut [u32],
    queue: &mut VecDeque<usize>,
    start: usize,
    label: u32,
    mut visit: impl FnMut(usize),
) -> usize {
    let width = mask.width() as usize;

    queue.clear();
    queue.push_back(start);
    labels[start] = label;
    let mut area = 0;

    while let Some(idx) = queue.pop_front() {
        area += 1;
        visit(idx);

        let (x, y) = ((idx % width) as i64, (idx / width) as i64);
        for &(dx, dy) in &NEIGHBORHOOD_4 {
            let (nx, ny) = (x + dx, y + dy);
            if !mask.get_or_unset(nx, ny) {
                continue;
            }
            let n_idx = ny as usize * width + nx as usize;
            if labels[n_idx] == 0 {
                labels[n_idx] = label;
                queue.push_back(n_idx);
            }
        }
    }

    area
}

/// Label the 4-connected components of `mask` in raster-scan order.
///
/// Components with `area >= min_keep` are recorded as regions; the label
/// counter advances for every component regardless.
pub fn label_components(mask: &Mask, min_keep: usize) -> Labeling {
    let total = mask.len();
    let mut labels = vec![0u32; total];
    let mut queue = VecDeque::new();
    let mut regions = Vec::new();
    let mut next_label = 1u32;

    for idx in 0..total {
        if !mask.as_slice()[idx] || labels[idx] != 0 {
            continue;
        }

        let area = flood_fill(mask, &mut labels, &mut queue, idx, next_label, |_| {});
        if area >= min_keep {
            let area_percent = 100.0 * area as f64 / total as f64;
            log::debug!(
                "Kept region {} with area {} pixels ({:.2}%)",
                next_label,
                area,
                area_percent
            );
            regions.push(Region {
                id: next_label,
                area_px: area,
                area_percent,
            });
        }
        next_label += 1;
    }

    Labeling {
        labels,
        regions,
        component_count: next_label - 1,
    }
}

/// Drop 4-connected components smaller than `min_size`
pub fn remove_small_regions(mask: &Mask, min_size: usize) -> Mask {
    let mut result = Mask::new(mask.width(), mask.height());
    let mut labels = vec![0u32; mask.len()];
    let mut queue = VecDeque::new();
    let mut members = Vec::new();

    for idx in 0..mask.len() {
        if !mask.as_slice()[idx] || labels[idx] != 0 {
            continue;
        }

        members.clear();
        let area = flood_fill(mask, &mut labels, &mut queue, idx, 1, |i| members.push(i));
        if area >= min_size {
            let out = result.as_mut_slice();
            for &i in &members {
                out[i] = true;
            }
        }
    }

    result
}
