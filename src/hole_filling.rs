use std::collections::VecDeque;

use crate::mask::Mask;

/// Fill background pixels that cannot reach the image border.
///
/// Unset border pixels seed a 4-connected flood through the unset pixels;
/// anything the flood never reaches is an interior hole and becomes set.
pub fn fill_holes(mask: &Mask) -> Mask {
    let (width, height) = (mask.width(), mask.height());
    if mask.is_empty() {
        return mask.clone();
    }

    let w = width as usize;
    let src = mask.as_slice();
    let mut outside = vec![false; src.len()];
    let mut queue = VecDeque::new();

    let seed = |idx: usize, outside: &mut Vec<bool>, queue: &mut VecDeque<usize>| {
        if !src[idx] && !outside[idx] {
            outside[idx] = true;
            queue.push_back(idx);
        }
    };

    for x in 0..w {
        seed(x, &mut outside, &mut queue);
        seed((height as usize - 1) * w + x, &mut outside, &mut queue);
    }
    for y in 1..(height as usize).saturating_sub(1) {
        seed(y * w, &mut outside, &mut queue);
        seed(y * w + (w - 1), &mut outside, &mut queue);
    }

    while let Some(idx) = queue.pop_front() {
        let (x, y) = ((idx % w) as i64, (idx / w) as i64);
        for (dx, dy) in [(0i64, -1i64), (0, 1), (-1, 0), (1, 0)] {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            let n_idx = ny as usize * w + nx as usize;
            if !src[n_idx] && !outside[n_idx] {
                outside[n_idx] = true;
                queue.push_back(n_idx);
            }
        }
    }

    Mask::from_fn(width, height, |i| src[i] || !outside[i])
}
