// src/clustering.rs - Seeded k-means over Lab features and border-vote background detection

use rand::Rng;

/// Images with at least this many pixels use four clusters instead of three
pub const LARGE_IMAGE_PIXELS: usize = 200 * 200;

/// Number of clusters used for an image of the given size
pub fn cluster_count(width: u32, height: u32) -> usize {
    if width as usize * height as usize >= LARGE_IMAGE_PIXELS {
        4
    } else {
        3
    }
}

/// Outcome of a k-means run
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Cluster id in `[0, k)` for every sample
    pub assignments: Vec<usize>,
    pub centroids: Vec<[f32; 3]>,
    /// Number of assignment passes that ran
    pub iterations: usize,
}

/// Lloyd's k-means with sampled initial centroids
#[derive(Debug, Clone, Copy)]
pub struct KMeans {
    pub k: usize,
    pub max_iterations: usize,
}

#[inline]
fn distance_squared(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dl = a[0] - b[0];
    let da = a[1] - b[1];
    let db = a[2] - b[2];
    dl * dl + da * da + db * db
}

impl KMeans {
    pub fn new(k: usize, max_iterations: usize) -> Self {
        Self { k, max_iterations }
    }

    /// Cluster `samples`, drawing the initial centroids from `rng`.
    ///
    /// Initial centroids are `k` samples picked uniformly with replacement.
    /// Distance ties go to the lowest cluster index and an empty cluster keeps
    /// its previous centroid. The loop ends after `max_iterations` passes or on
    /// the first pass after the first that changes no assignment. At least one
    /// assignment pass always runs, so every sample ends in `[0, k)`.
    pub fn fit<R: Rng + ?Sized>(&self, samples: &[[f32; 3]], rng: &mut R) -> Clustering {
        let n = samples.len();
        if n == 0 || self.k == 0 {
            return Clustering {
                assignments: vec![0; n],
                centroids: Vec::new(),
                iterations: 0,
            };
        }

        let mut centroids: Vec<[f32; 3]> = (0..self.k)
            .map(|_| samples[rng.gen_range(0..n)])
            .collect();

        let mut assignments = vec![usize::MAX; n];
        let mut sums = vec![[0.0f64; 3]; self.k];
        let mut counts = vec![0usize; self.k];
        let mut iterations = 0;

        for iteration in 0..self.max_iterations.max(1) {
            iterations = iteration + 1;
            let mut changed = false;

            for (sample, assignment) in samples.iter().zip(assignments.iter_mut()) {
                let mut best = 0;
                let mut best_distance = distance_squared(sample, &centroids[0]);
                for (c, centroid) in centroids.iter().enumerate().skip(1) {
                    let d = distance_squared(sample, centroid);
                    if d < best_distance {
                        best_distance = d;
                        best = c;
                    }
                }

                if *assignment != best {
                    *assignment = best;
                    changed = true;
                }
            }

            if !changed && iteration > 0 {
                break;
            }

            sums.iter_mut().for_each(|s| *s = [0.0; 3]);
            counts.iter_mut().for_each(|c| *c = 0);

            for (sample, &c) in samples.iter().zip(&assignments) {
                sums[c][0] += sample[0] as f64;
                sums[c][1] += sample[1] as f64;
                sums[c][2] += sample[2] as f64;
                counts[c] += 1;
            }

            for ((centroid, sum), &count) in centroids.iter_mut().zip(&sums).zip(&counts) {
                if count == 0 {
                    continue;
                }
                let count = count as f64;
                *centroid = [
                    (sum[0] / count) as f32,
                    (sum[1] / count) as f32,
                    (sum[2] / count) as f32,
                ];
            }
        }

        Clustering {
            assignments,
            centroids,
            iterations,
        }
    }
}

/// Cluster holding the most border pixels.
///
/// Votes come from the full top and bottom rows, then from the left and right
/// columns with those two rows skipped. Ties go to the lowest cluster index.
pub fn background_cluster(assignments: &[usize], width: u32, height: u32, k: usize) -> usize {
    let (w, h) = (width as usize, height as usize);
    let mut votes = vec![0usize; k];

    for x in 0..w {
        votes[assignments[x]] += 1;
        votes[assignments[(h - 1) * w + x]] += 1;
    }
    for y in 1..h.saturating_sub(1) {
        votes[assignments[y * w]] += 1;
        votes[assignments[y * w + (w - 1)]] += 1;
    }

    let mut background = 0;
    for (cluster, &count) in votes.iter().enumerate().skip(1) {
        if count > votes[background] {
            background = cluster;
        }
    }
    background
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_tone_samples() -> Vec<[f32; 3]> {
        let mut samples = vec![[0.0, 0.0, 0.0]; 90];
        samples.extend(std::iter::repeat([100.0, 0.0, 0.0]).take(10));
        samples
    }

    #[test]
    fn cluster_count_switches_at_large_images() {
        assert_eq!(cluster_count(100, 100), 3);
        assert_eq!(cluster_count(199, 200), 3);
        assert_eq!(cluster_count(200, 200), 4);
    }

    #[test]
    fn separates_two_tones() {
        let samples = two_tone_samples();
        let mut rng = StdRng::seed_from_u64(12345);
        let result = KMeans::new(3, 15).fit(&samples, &mut rng);

        let dark = result.assignments[0];
        let light = result.assignments[95];
        assert_ne!(dark, light);
        assert!(result.assignments[..90].iter().all(|&c| c == dark));
        assert!(result.assignments[90..].iter().all(|&c| c == light));
        assert!(result.iterations <= 15);
    }

    #[test]
    fn identical_seed_gives_identical_assignments() {
        let samples = two_tone_samples();
        let a = KMeans::new(3, 15).fit(&samples, &mut StdRng::seed_from_u64(7));
        let b = KMeans::new(3, 15).fit(&samples, &mut StdRng::seed_from_u64(7));
        assert_eq!(a.assignments, b.assignments);
    }

    #[test]
    fn uniform_input_collapses_to_cluster_zero() {
        let samples = vec![[42.0, 1.0, -3.0]; 50];
        let result = KMeans::new(3, 15).fit(&samples, &mut StdRng::seed_from_u64(1));
        assert!(result.assignments.iter().all(|&c| c == 0));
        // Second pass sees no change and stops
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn zero_iteration_limit_still_assigns_every_sample() {
        let samples = two_tone_samples();
        let result = KMeans::new(3, 0).fit(&samples, &mut StdRng::seed_from_u64(5));
        assert_eq!(result.iterations, 1);
        assert!(result.assignments.iter().all(|&c| c < 3));

        // The assignments are safe to feed into the border vote
        let background = background_cluster(&result.assignments, 10, 10, 3);
        assert!(background < 3);
    }

    #[test]
    fn empty_clusters_keep_their_centroid() {
        let samples = vec![[10.0, 0.0, 0.0]; 20];
        let result = KMeans::new(4, 15).fit(&samples, &mut StdRng::seed_from_u64(3));
        assert_eq!(result.centroids.len(), 4);
        for centroid in &result.centroids {
            assert_eq!(*centroid, [10.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn background_is_border_majority() {
        // 4x3 image: border of cluster 2, interior of cluster 1
        let assignments = vec![
            2, 2, 2, 2,
            2, 1, 1, 2,
            2, 2, 2, 2,
        ];
        assert_eq!(background_cluster(&assignments, 4, 3, 3), 2);
    }

    #[test]
    fn background_tie_goes_to_lowest_index() {
        // Top row cluster 1, bottom row cluster 0, no interior rows
        let assignments = vec![1, 1, 1, 0, 0, 0];
        assert_eq!(background_cluster(&assignments, 3, 2, 2), 0);
    }

    #[test]
    fn corners_are_counted_once() {
        // 3x3: corners are cluster 1, edge midpoints cluster 0.
        // Rows give cluster 1 four votes and cluster 0 two; the columns add two
        // more for cluster 0, so the tie resolves to cluster 0.
        let assignments = vec![
            1, 0, 1,
            0, 0, 0,
            1, 0, 1,
        ];
        assert_eq!(background_cluster(&assignments, 3, 3, 2), 0);
    }
}
