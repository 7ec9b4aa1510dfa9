use crate::mask::Mask;

/// Upper bound on dilate-and-mask passes during reconstruction
pub const RECONSTRUCTION_MAX_ITERATIONS: usize = 64;

/// 3x3 structuring element, origin included
static NEIGHBORHOOD_8: [(i64, i64); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),  (0, 0),  (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Applies morphological erosion with the 8-neighbourhood.
/// A pixel survives only if it and all eight neighbours are set;
/// out-of-bounds neighbours count as unset.
pub fn erode(mask: &Mask) -> Mask {
    let (width, height) = (mask.width(), mask.height());
    let mut result = Mask::new(width, height);

    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) {
                continue;
            }

            let mut keep = true;
            for &(dx, dy) in &NEIGHBORHOOD_8 {
                if !mask.get_or_unset(x as i64 + dx, y as i64 + dy) {
                    keep = false;
                    break;
                }
            }

            if keep {
                result.set(x, y, true);
            }
        }
    }

    result
}

/// Applies morphological dilation with the 8-neighbourhood.
/// A pixel is set if it or any neighbour is set.
pub fn dilate(mask: &Mask) -> Mask {
    let (width, height) = (mask.width(), mask.height());
    let mut result = Mask::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut hit = false;
            for &(dx, dy) in &NEIGHBORHOOD_8 {
                if mask.get_or_unset(x as i64 + dx, y as i64 + dy) {
                    hit = true;
                    break;
                }
            }

            if hit {
                result.set(x, y, true);
            }
        }
    }

    result
}

/// `rounds` times: erosion followed by dilation
pub fn open(mask: &Mask, rounds: u32) -> Mask {
    let mut out = mask.clone();
    for _ in 0..rounds {
        out = dilate(&erode(&out));
    }
    out
}

/// `rounds` times: dilation followed by erosion
pub fn close(mask: &Mask, rounds: u32) -> Mask {
    let mut out = mask.clone();
    for _ in 0..rounds {
        out = erode(&dilate(&out));
    }
    out
}

/// Opening by reconstruction.
///
/// The seed is `src` eroded `erosion_rounds` times; it is then grown by
/// `seed = dilate(seed) AND src` until nothing changes or
/// [`RECONSTRUCTION_MAX_ITERATIONS`] passes have run. Regions whose seed
/// survives come back with their full original shape.
pub fn opening_by_reconstruction(src: &Mask, erosion_rounds: u32) -> Mask {
    let mut seed = src.clone();
    for _ in 0..erosion_rounds {
        seed = erode(&seed);
    }

    for _ in 0..RECONSTRUCTION_MAX_ITERATIONS {
        let grown = dilate(&seed).and(src);
        if grown == seed {
            break;
        }
        seed = grown;
    }

    seed
}

/// Dilate `rounds` times, clipping to `allow` after every round
pub fn constrained_grow(src: &Mask, allow: &Mask, rounds: u32) -> Mask {
    let mut current = src.clone();
    for _ in 0..rounds {
        current = dilate(&current).and(allow);
    }
    current
}

/// Morphological gradient `dilate(mask) AND NOT erode(mask)`, a boundary band
/// about two pixels wide used for outline rendering
pub fn morphological_gradient(mask: &Mask) -> Mask {
    dilate(mask).and_not(&erode(mask))
}
