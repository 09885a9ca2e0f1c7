//! Spatial filters over single channel float planes.
//!
//! Borders are handled by mirroring without repeating the edge sample
//! (`dcb|abcd|cba`).

use rayon::prelude::*;

/// Mirrors an out-of-range index back into `0..len`.
#[inline]
pub fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let mut i = index.rem_euclid(period);
    if i >= len as isize {
        i = period - i;
    }
    i as usize
}

/// Sigma used for a kernel of odd size `ksize` when none is given.
pub fn sigma_for_kernel(ksize: usize) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalised 1D Gaussian kernel of odd size `ksize`.
pub fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    if ksize <= 1 {
        return vec![1.0];
    }
    let sigma = sigma_for_kernel(ksize);
    let half = (ksize / 2) as f32;
    let scale = -0.5 / (sigma * sigma);
    let mut kernel: Vec<f32> = (0..ksize)
        .map(|i| {
            let x = i as f32 - half;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Separable Gaussian blur with a square `ksize` x `ksize` kernel.
pub fn gaussian_blur(plane: &[f32], width: usize, height: usize, ksize: usize) -> Vec<f32> {
    if ksize <= 1 || width == 0 || height == 0 {
        return plane.to_vec();
    }
    let kernel = gaussian_kernel(ksize);
    let half = (ksize / 2) as isize;

    let mut horizontal = vec![0.0f32; plane.len()];
    horizontal
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let src = &plane[y * width..(y + 1) * width];
            for (x, out) in row.iter_mut().enumerate() {
                *out = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, w)| w * src[reflect_101(x as isize + k as isize - half, width)])
                    .sum();
            }
        });

    let mut blurred = vec![0.0f32; plane.len()];
    blurred
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                *out = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, w)| {
                        let sy = reflect_101(y as isize + k as isize - half, height);
                        w * horizontal[sy * width + x]
                    })
                    .sum();
            }
        });
    blurred
}

/// Edge preserving smoothing: each output is the average of neighbours within a
/// disc of `radius`, weighted by spatial distance and by value difference.
pub fn bilateral_filter(
    plane: &[f32],
    width: usize,
    height: usize,
    radius: usize,
    sigma_space: f32,
    sigma_range: f32,
) -> Vec<f32> {
    if radius == 0 || width == 0 || height == 0 {
        return plane.to_vec();
    }
    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let range_coeff = -0.5 / (sigma_range * sigma_range);
    let r = radius as isize;

    // (dx, dy, spatial weight) inside the disc
    let mut taps = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            let dist2 = (dx * dx + dy * dy) as f32;
            if dist2 > (r * r) as f32 {
                continue;
            }
            taps.push((dx, dy, (dist2 * space_coeff).exp()));
        }
    }

    let mut out = vec![0.0f32; plane.len()];
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, value) in row.iter_mut().enumerate() {
                let center = plane[y * width + x];
                let mut sum = 0.0f32;
                let mut weight_sum = 0.0f32;
                for &(dx, dy, spatial) in &taps {
                    let sx = reflect_101(x as isize + dx, width);
                    let sy = reflect_101(y as isize + dy, height);
                    let v = plane[sy * width + sx];
                    let diff = v - center;
                    let w = spatial * (diff * diff * range_coeff).exp();
                    sum += w * diff;
                    weight_sum += w;
                }
                // accumulated relative to the centre so flat regions stay exact
                *value = if weight_sum > 0.0 {
                    center + sum / weight_sum
                } else {
                    center
                };
            }
        });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        assert_eq!(reflect_101(-7, 1), 0);
        assert_eq!(reflect_101(-3, 2), 1);
    }

    #[test]
    fn test_gaussian_kernel_is_normalised_and_symmetric() {
        for ksize in [3, 5, 9, 35] {
            let kernel = gaussian_kernel(ksize);
            assert_eq!(kernel.len(), ksize);
            assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
            for i in 0..ksize / 2 {
                assert!((kernel[i] - kernel[ksize - 1 - i]).abs() < 1e-7);
            }
        }
        assert_eq!(gaussian_kernel(1), vec![1.0]);
    }

    #[test]
    fn test_blur_preserves_constant_plane() {
        let plane = vec![2.5f32; 7 * 5];
        let blurred = gaussian_blur(&plane, 7, 5, 9);
        assert!(blurred.iter().all(|v| (v - 2.5).abs() < 1e-5));
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let mut plane = vec![0.0f32; 9 * 9];
        plane[4 * 9 + 4] = 1.0;
        let blurred = gaussian_blur(&plane, 9, 9, 3);
        assert!(blurred[4 * 9 + 4] < 1.0);
        assert!(blurred[4 * 9 + 5] > 0.0);
        assert!((blurred.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_bilateral_keeps_strong_edge() {
        // step of 10 with a narrow range sigma stays a step
        let width = 12;
        let plane: Vec<f32> = (0..width * 4)
            .map(|i| if i % width < width / 2 { 0.0 } else { 10.0 })
            .collect();
        let filtered = bilateral_filter(&plane, width, 4, 3, 3.0, 0.5);
        for y in 0..4 {
            assert!(filtered[y * width + width / 2 - 1] < 0.01);
            assert!(filtered[y * width + width / 2] > 9.99);
        }
    }

    #[test]
    fn test_bilateral_keeps_flat_plane_exact() {
        let plane = vec![0.693_147_2f32; 10 * 6];
        assert_eq!(bilateral_filter(&plane, 10, 6, 5, 30.0, 30.0), plane);
    }

    #[test]
    fn test_bilateral_smooths_small_noise() {
        let width = 8;
        let plane: Vec<f32> = (0..width * width)
            .map(|i| if i % 2 == 0 { 1.0 } else { 1.2 })
            .collect();
        let filtered = bilateral_filter(&plane, width, width, 2, 30.0, 30.0);
        for v in filtered {
            assert!((v - 1.1).abs() < 0.05);
        }
    }
}
