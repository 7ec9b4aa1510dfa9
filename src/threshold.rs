// src/threshold.rs - Otsu global threshold over the luma histogram

/// 256-bin histogram of luma values
pub fn luma_histogram(luma: &[u8]) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for &v in luma {
        hist[v as usize] += 1;
    }
    hist
}

/// Otsu threshold maximising `wB * wF * (meanB - meanF)^2`.
///
/// Pixels with luma `<= t` form the lower class. The scan stops once the
/// upper class is empty. When several candidates share the maximum (an empty
/// gap between two luma populations) the highest one is returned, which puts
/// the threshold at the lower edge of the brighter population.
pub fn otsu_threshold(luma: &[u8]) -> u8 {
    let hist = luma_histogram(luma);
    let total = luma.len() as u64;

    let sum_all: u64 = hist
        .iter()
        .enumerate()
        .map(|(value, &count)| value as u64 * count)
        .sum();

    let mut sum_b = 0u64;
    let mut weight_b = 0u64;
    let mut max_between = -1.0f64;
    let mut threshold = 0u8;

    for (t, &count) in hist.iter().enumerate() {
        weight_b += count;
        if weight_b == 0 {
            continue;
        }

        let weight_f = total - weight_b;
        if weight_f == 0 {
            break;
        }

        sum_b += t as u64 * count;
        let mean_b = sum_b as f64 / weight_b as f64;
        let mean_f = (sum_all - sum_b) as f64 / weight_f as f64;
        let diff = mean_b - mean_f;
        let between = weight_b as f64 * weight_f as f64 * diff * diff;

        if between >= max_between {
            max_between = between;
            threshold = t as u8;
        }
    }

    threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_thresholds_at_zero() {
        let luma = vec![128u8; 100];
        assert_eq!(otsu_threshold(&luma), 0);
    }

    #[test]
    fn empty_gap_resolves_to_upper_edge() {
        let mut luma = vec![0u8; 87];
        luma.extend(std::iter::repeat(255u8).take(13));
        assert_eq!(otsu_threshold(&luma), 254);
    }

    #[test]
    fn separates_two_populations() {
        let mut luma = Vec::new();
        for v in 40..60u8 {
            luma.extend(std::iter::repeat(v).take(10));
        }
        for v in 180..200u8 {
            luma.extend(std::iter::repeat(v).take(10));
        }
        let t = otsu_threshold(&luma);
        assert!((59..180).contains(&t), "threshold {} should fall between the populations", t);
    }

    #[test]
    fn picks_the_unique_maximum() {
        // Three levels: the best split isolates the small bright group
        let mut luma = vec![10u8; 50];
        luma.extend(std::iter::repeat(20u8).take(50));
        luma.extend(std::iter::repeat(200u8).take(10));
        let t = otsu_threshold(&luma);
        assert!((20..200).contains(&t));
    }

    #[test]
    fn unique_maximum_beats_later_candidates() {
        // Adjacent bins, no gap: t=10 scores 6400, t=11 only ~6171
        let mut luma = vec![10u8; 50];
        luma.extend(std::iter::repeat(11u8).take(20));
        luma.extend(std::iter::repeat(12u8).take(30));
        assert_eq!(otsu_threshold(&luma), 10);
    }

    #[test]
    fn unique_maximum_inside_contiguous_histogram() {
        // Counts 40/10/10/40 on levels 0..=3: t=1 scores 16900, t=0 and t=2 15000
        let mut luma = vec![0u8; 40];
        luma.extend(std::iter::repeat(1u8).take(10));
        luma.extend(std::iter::repeat(2u8).take(10));
        luma.extend(std::iter::repeat(3u8).take(40));
        assert_eq!(otsu_threshold(&luma), 1);
    }

    #[test]
    fn histogram_counts_every_pixel() {
        let hist = luma_histogram(&[0, 0, 7, 255]);
        assert_eq!(hist[0], 2);
        assert_eq!(hist[7], 1);
        assert_eq!(hist[255], 1);
        assert_eq!(hist.iter().sum::<u64>(), 4);
    }
}
