//! Spectral analysis entry points. The continuous transform follows
//! 'Accurate Spectral Analysis of Two-Dimensional Point Sets' by
//! Schlomer and Deussen, computing the exact Fourier transform of a
//! point set without discretising it into pixels. The discrete
//! transforms operate on per-pixel fields such as the optimiser's
//! estimate grid.

use std::f32::consts::PI;

use crossbeam;
use num_cpus;

use errors::{Error, Result};

fn mean(values: &[f32]) -> f32 {
    let mut mean = 0.0;
    for (i, &v) in values.iter().enumerate() {
        mean += (v - mean) / (i + 1) as f32;
    }
    mean
}

/// Rescale into [0, 1]. A constant input maps to all zeros.
fn normalise(values: &mut [f32]) {
    let mut min = values[0];
    let mut max = values[0];
    for &v in values.iter() {
        min = v.min(min);
        max = v.max(max);
    }

    if max > min {
        for v in values.iter_mut() {
            *v = (*v - min) / (max - min);
        }
    } else {
        for v in values.iter_mut() {
            *v = 0.0;
        }
    }
}

/// Exact continuous power spectrum of one dimension pair of a point
/// set, averaged over its sequences and log tonemapped. The output is
/// a resolution * resolution image with the DC term at the centre.
///
/// `points` is the row-major (sequence, sample, dimension) layout
/// produced by `generate`; its length must agree with the declared
/// shape and the chosen dimensions must exist.
pub fn frequency_continuous(
    nsequences: usize,
    nsamples: usize,
    ndims: usize,
    depth_a: usize,
    depth_b: usize,
    resolution: usize,
    points: &[f32],
) -> Result<Vec<f32>> {
    if ndims == 0 || depth_a >= ndims || depth_b >= ndims {
        return Err(Error::InvalidDimensions(format!(
            "dimension pair ({}, {}) out of range for {} dimensions",
            depth_a, depth_b, ndims
        )));
    }

    if nsequences == 0 || nsamples == 0 || resolution == 0 {
        return Err(Error::InvalidDimensions(
            "sequence, sample and resolution counts must be non-zero".to_string(),
        ));
    }

    let expected = nsequences * nsamples * ndims;
    if points.len() != expected {
        return Err(Error::BufferSizeMismatch {
            expected,
            actual: points.len(),
        });
    }

    debug!(
        "computing continuous spectrum";
        "nsequences" => nsequences,
        "nsamples" => nsamples,
        "resolution" => resolution
    );

    let mut out = vec![0.0f32; resolution * resolution];

    let nthreads = num_cpus::get().max(1);
    let rows_per_chunk = (resolution + nthreads - 1) / nthreads;

    crossbeam::scope(|scope| {
        for (chunk, rows) in out.chunks_mut(rows_per_chunk * resolution).enumerate() {
            scope.spawn(move |_| {
                let row_base = chunk * rows_per_chunk;
                for (row, line) in rows.chunks_mut(resolution).enumerate() {
                    let dy = (row_base + row) as f32 - resolution as f32 / 2.0;
                    for (col, value) in line.iter_mut().enumerate() {
                        let dx = col as f32 - resolution as f32 / 2.0;

                        let mut spectrum = 0.0f32;
                        for s in 0..nsequences {
                            let mut fx = 0.0f32;
                            let mut fy = 0.0f32;
                            for i in 0..nsamples {
                                let index = (s * nsamples + i) * ndims;
                                let x = points[index + depth_a];
                                let y = points[index + depth_b];

                                let exp = -2.0 * PI * (dx * x + dy * y);
                                fx += exp.cos();
                                fy += exp.sin();
                            }
                            spectrum += (fx * fx + fy * fy) / nsamples as f32;
                        }

                        let average = spectrum / nsequences as f32;
                        *value = (1.0 + 0.5 * average).log2();
                    }
                }
            });
        }
    })
    .map_err(|_| Error::NativeFailure("spectrum worker thread panicked".to_string()))?;

    Ok(out)
}

/// One-dimensional complex DFT, direct evaluation. Row resolutions are
/// small enough that the quadratic cost stays below any FFT setup
/// worth carrying.
pub fn frequency_discrete_1d(
    in_real: &[f32],
    in_imaginary: &[f32],
    out_real: &mut [f32],
    out_imaginary: &mut [f32],
) -> Result<()> {
    let resolution = in_real.len();
    for other in &[in_imaginary.len(), out_real.len(), out_imaginary.len()] {
        if *other != resolution {
            return Err(Error::BufferSizeMismatch {
                expected: resolution,
                actual: *other,
            });
        }
    }

    let inv_resolution = 1.0 / resolution as f32;

    for i in 0..resolution {
        let constant = 2.0 * PI * i as f32 * inv_resolution;

        let mut sum_real = 0.0f32;
        let mut sum_imaginary = 0.0f32;
        for j in 0..resolution {
            let cosine = (j as f32 * constant).cos();
            let sine = (j as f32 * constant).sin();

            sum_real += in_real[j] * cosine + in_imaginary[j] * sine;
            sum_imaginary += -in_real[j] * sine + in_imaginary[j] * cosine;
        }

        out_real[i] = sum_real * inv_resolution;
        out_imaginary[i] = sum_imaginary * inv_resolution;
    }

    Ok(())
}

/// Centered spectrum magnitude of a square per-pixel field: the mean
/// is removed, the field shifted so DC lands at the image centre, and
/// the log magnitude normalised into [0, 1]. The transform is built
/// from row passes and a transpose.
pub fn frequency_discrete_2d(field: &[f32], resolution: usize) -> Result<Vec<f32>> {
    let npixels = resolution * resolution;
    if field.len() != npixels || npixels == 0 {
        return Err(Error::BufferSizeMismatch {
            expected: npixels,
            actual: field.len(),
        });
    }

    let average = mean(field);

    let mut real_a = vec![0.0f32; npixels];
    let mut real_b = vec![0.0f32; npixels];
    let mut imaginary_a = vec![0.0f32; npixels];
    let mut imaginary_b = vec![0.0f32; npixels];

    for (i, value) in real_a.iter_mut().enumerate() {
        let x = i % resolution;
        let y = i / resolution;
        let shift = if (x + y) % 2 == 0 { 1.0 } else { -1.0 };

        *value = (field[i] - average) * shift;
    }

    for i in 0..resolution {
        let index = i * resolution;
        let range = index..index + resolution;

        frequency_discrete_1d(
            &real_a[range.clone()],
            &imaginary_a[range.clone()],
            &mut real_b[range.clone()],
            &mut imaginary_b[range],
        )?;
    }

    for i in 0..npixels {
        let index = (i % resolution) * resolution + i / resolution;

        real_a[i] = real_b[index];
        imaginary_a[i] = imaginary_b[index];
    }

    for i in 0..resolution {
        let index = i * resolution;
        let range = index..index + resolution;

        frequency_discrete_1d(
            &real_a[range.clone()],
            &imaginary_a[range.clone()],
            &mut real_b[range.clone()],
            &mut imaginary_b[range],
        )?;
    }

    let mut out = vec![0.0f32; npixels];
    for (i, value) in out.iter_mut().enumerate() {
        let magnitude = (real_b[i] * real_b[i] + imaginary_b[i] * imaginary_b[i]).sqrt();
        *value = (magnitude + 1.0).ln();
    }

    normalise(&mut out);

    Ok(out)
}

/// Per-depth-slice form of the 2-D transform over a (resolution,
/// resolution, depth) field.
pub fn frequency_discrete_3d(field: &[f32], resolution: usize, depth: usize) -> Result<Vec<f32>> {
    let size = resolution * resolution;
    if field.len() != size * depth || depth == 0 {
        return Err(Error::BufferSizeMismatch {
            expected: size * depth,
            actual: field.len(),
        });
    }

    let mut out = Vec::with_capacity(field.len());
    for slice in field.chunks(size) {
        out.extend(frequency_discrete_2d(slice, resolution)?);
    }

    Ok(out)
}

/// Mean magnitude of the spectrum bins within `radius` pixels of the
/// image centre. With a centered spectrum this measures low-frequency
/// energy, the band blue-noise optimisation is meant to empty.
pub fn frequency_band(spectrum: &[f32], resolution: usize, radius: f32) -> Result<f32> {
    let npixels = resolution * resolution;
    if spectrum.len() != npixels || npixels == 0 {
        return Err(Error::BufferSizeMismatch {
            expected: npixels,
            actual: spectrum.len(),
        });
    }

    let centre = resolution as f32 / 2.0;

    let mut sum = 0.0;
    let mut count = 0;
    for (i, &value) in spectrum.iter().enumerate() {
        let dx = (i % resolution) as f32 - centre;
        let dy = (i / resolution) as f32 - centre;

        if (dx * dx + dy * dy).sqrt() <= radius {
            sum += value;
            count += 1;
        }
    }

    if count == 0 {
        return Err(Error::InvalidDimensions(format!(
            "band radius {} covers no spectrum bins",
            radius
        )));
    }

    Ok(sum / count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rng::RNG;

    #[test]
    fn continuous_spectrum_has_a_dc_peak() {
        let mut rng = RNG::with_seed(3);
        let nsamples = 16;
        let points: Vec<f32> = (0..nsamples * 2).map(|_| rng.uniform_f32()).collect();

        let resolution = 8;
        let spectrum = frequency_continuous(1, nsamples, 2, 0, 1, resolution, &points).unwrap();

        // At the centre every phase is zero, so the power is exactly
        // the sample count.
        let centre = spectrum[resolution / 2 + resolution / 2 * resolution];
        let expected = (1.0 + 0.5 * nsamples as f32).log2();
        assert!((centre - expected).abs() < 1e-3);
        assert!(spectrum.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn continuous_spectrum_validates_its_buffer() {
        let points = vec![0.5f32; 10];
        match frequency_continuous(1, 8, 2, 0, 1, 4, &points) {
            Err(Error::BufferSizeMismatch { expected, actual }) => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 10);
            }
            other => panic!("unexpected result: {:?}", other.map(|v| v.len())),
        }
        assert!(frequency_continuous(1, 8, 2, 0, 2, 4, &points).is_err());
    }

    #[test]
    fn discrete_2d_of_a_constant_field_is_empty() {
        let field = vec![0.25f32; 64];
        let spectrum = frequency_discrete_2d(&field, 8).unwrap();
        assert!(spectrum.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn discrete_2d_of_a_checkerboard_peaks_at_nyquist() {
        let resolution = 8;
        let field: Vec<f32> = (0..resolution * resolution)
            .map(|i| {
                let x = i % resolution;
                let y = i / resolution;
                if (x + y) % 2 == 0 {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();

        let spectrum = frequency_discrete_2d(&field, resolution).unwrap();

        // The checkerboard is the Nyquist frequency; after centering it
        // lands in the corner bin.
        let peak = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 0);
    }

    #[test]
    fn discrete_3d_transforms_each_slice() {
        let field = vec![1.0f32; 4 * 4 * 3];
        let spectrum = frequency_discrete_3d(&field, 4, 3).unwrap();
        assert_eq!(spectrum.len(), 48);
        assert!(frequency_discrete_3d(&field, 4, 2).is_err());
    }

    #[test]
    fn band_measures_the_spectrum_centre() {
        let resolution = 8;
        let mut spectrum = vec![0.0f32; resolution * resolution];
        spectrum[resolution / 2 + resolution / 2 * resolution] = 1.0;

        let low = frequency_band(&spectrum, resolution, 1.0).unwrap();
        let wide = frequency_band(&spectrum, resolution, 8.0).unwrap();
        assert!(low > wide);
        assert!(frequency_band(&spectrum, 4, 1.0).is_err());
    }
}
