//! Palette extraction: clustering sampled pixels into a few representative colors.
//!
//! Two methods are available through [`Quantizer`]:
//!
//! - **Variance cut** (default): greedy box splitting of the RGB cube in
//!   the median-cut family. The box with the largest squared error is cut
//!   where the two halves have the least total squared error, the criterion
//!   Wu's quantizer uses. Exactly `min(k, distinct)` clusters come out and
//!   every representative is distinct.
//! - **K-means**: Lloyd iterations in CIE Lab via `kmeans_colors`, with a
//!   fixed seed. Empty clusters are dropped and clusters that round to the
//!   same color are merged, so it can return fewer than `k` entries.
//!
//! Both produce the same kind of [`Palette`]: each entry is the rounded
//! per-channel RGB mean of its samples, sorted by population descending and
//! then by (r, g, b) ascending. All bookkeeping uses ordered containers, so
//! the output is a pure function of the input sequence.

use std::collections::BTreeMap;

use kmeans_colors::get_kmeans;
use palette::{IntoColor, Lab, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::{GradientError, Result};
use crate::pixel::Pixel;

/// Lloyd iteration cap used by [`Quantizer::kmeans`].
pub const DEFAULT_KMEANS_ITERATIONS: usize = 20;
/// Largest `k` the k-means backend can index (cluster ids are bytes).
pub const MAX_KMEANS_COLORS: usize = 256;

const KMEANS_CONVERGENCE: f32 = 1e-4;

// ------------------------------------------------------------
// Palette
// ------------------------------------------------------------

/// One palette entry with the number of samples it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Swatch {
    pub color: Pixel,
    pub population: usize,
}

/// Representative colors ordered by descending prominence.
///
/// Deserialization goes through [`Palette::from_swatches`], so a palette
/// read back from JSON is in palette order whatever order it was written in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "Vec<Swatch>", from = "Vec<Swatch>")]
pub struct Palette {
    swatches: Vec<Swatch>,
}

impl From<Vec<Swatch>> for Palette {
    fn from(swatches: Vec<Swatch>) -> Self {
        Self::from_swatches(swatches)
    }
}

impl From<Palette> for Vec<Swatch> {
    fn from(palette: Palette) -> Self {
        palette.swatches
    }
}

impl Palette {
    /// Sort `swatches` into palette order: population descending, then
    /// color ascending.
    pub fn from_swatches(mut swatches: Vec<Swatch>) -> Self {
        swatches.sort_by(|a, b| {
            b.population
                .cmp(&a.population)
                .then_with(|| a.color.cmp(&b.color))
        });
        Self { swatches }
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn get(&self, index: usize) -> Option<Pixel> {
        self.swatches.get(index).map(|s| s.color)
    }

    pub fn colors(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.swatches.iter().map(|s| s.color)
    }

    /// `#rrggbb` strings in palette order, as shown to the user.
    pub fn hex_codes(&self) -> Vec<String> {
        self.colors().map(|c| c.to_string()).collect()
    }
}

// ------------------------------------------------------------
// Method selection
// ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum Quantizer {
    #[default]
    VarianceCut,
    KMeans {
        #[serde(default = "default_kmeans_iterations")]
        max_iter: usize,
        #[serde(default)]
        seed: u64,
    },
}

fn default_kmeans_iterations() -> usize {
    DEFAULT_KMEANS_ITERATIONS
}

impl Quantizer {
    /// K-means with the default iteration cap and seed 0.
    pub const fn kmeans() -> Self {
        Quantizer::KMeans {
            max_iter: DEFAULT_KMEANS_ITERATIONS,
            seed: 0,
        }
    }

    /// Reject parameters the method cannot run with.
    pub fn validate(&self, k: usize) -> Result<()> {
        if k == 0 {
            return Err(GradientError::InvalidConfiguration(
                "palette size must be at least 1".into(),
            ));
        }
        if let Quantizer::KMeans { max_iter, .. } = *self {
            if k > MAX_KMEANS_COLORS {
                return Err(GradientError::InvalidConfiguration(format!(
                    "k-means supports at most {MAX_KMEANS_COLORS} colors, got {k}"
                )));
            }
            if max_iter == 0 {
                return Err(GradientError::InvalidConfiguration(
                    "k-means needs at least one iteration".into(),
                ));
            }
        }
        Ok(())
    }

    /// Cluster `samples` into at most `k` colors.
    ///
    /// When the samples hold `k` or fewer distinct colors each one becomes
    /// its own entry, whichever method is selected.
    ///
    /// # Errors
    ///
    /// [`GradientError::InvalidImage`] for an empty sample set,
    /// [`GradientError::InvalidConfiguration`] for parameters rejected by
    /// [`Quantizer::validate`].
    pub fn quantize(&self, samples: &[Pixel], k: usize) -> Result<Palette> {
        self.validate(k)?;
        if samples.is_empty() {
            return Err(GradientError::InvalidImage(
                "no pixels to quantize".into(),
            ));
        }

        let histogram = histogram(samples);
        if histogram.len() <= k {
            tracing::debug!(distinct = histogram.len(), k, "fewer distinct colors than k");
            return Ok(Palette::from_swatches(
                histogram
                    .into_iter()
                    .map(|(color, population)| Swatch { color, population })
                    .collect(),
            ));
        }

        let palette = match *self {
            Quantizer::VarianceCut => variance_cut(histogram, k),
            Quantizer::KMeans { max_iter, seed } => kmeans(samples, k, max_iter, seed),
        };
        tracing::debug!(
            method = ?self,
            samples = samples.len(),
            colors = palette.len(),
            "quantized"
        );
        Ok(palette)
    }
}

/// Quantize with the default [`Quantizer::VarianceCut`] method.
pub fn quantize(samples: &[Pixel], k: usize) -> Result<Palette> {
    Quantizer::VarianceCut.quantize(samples, k)
}

/// Distinct colors with their counts, ascending by color.
fn histogram(samples: &[Pixel]) -> Vec<(Pixel, usize)> {
    let mut counts: BTreeMap<Pixel, usize> = BTreeMap::new();
    for &p in samples {
        *counts.entry(p).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Rounded (half up) mean of weighted channel sums.
fn mean_color(sums: [u64; 3], population: usize) -> Pixel {
    let n = population as u64;
    let avg = |s: u64| ((s + n / 2) / n).min(255) as u8;
    Pixel::new(avg(sums[0]), avg(sums[1]), avg(sums[2]))
}

// ------------------------------------------------------------
// Variance cut
// ------------------------------------------------------------

/// Count, channel sums and summed squares of a set of weighted colors.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    weight: u64,
    sum: [u64; 3],
    sum_sq: u64,
}

impl Moments {
    fn add(&mut self, color: Pixel, count: usize) {
        let n = count as u64;
        self.weight += n;
        for (sum, v) in self.sum.iter_mut().zip(color.channels()) {
            let v = u64::from(v);
            *sum += v * n;
            self.sum_sq += v * v * n;
        }
    }

    fn minus(self, other: Moments) -> Moments {
        Moments {
            weight: self.weight - other.weight,
            sum: [
                self.sum[0] - other.sum[0],
                self.sum[1] - other.sum[1],
                self.sum[2] - other.sum[2],
            ],
            sum_sq: self.sum_sq - other.sum_sq,
        }
    }

    /// Sum of squared distances to the mean.
    fn squared_error(&self) -> f64 {
        if self.weight == 0 {
            return 0.0;
        }
        let norm: f64 = self.sum.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (self.sum_sq as f64 - norm / self.weight as f64).max(0.0)
    }
}

/// An axis-aligned region of the RGB cube with the colors inside it.
#[derive(Debug)]
struct ColorBox {
    entries: Vec<(Pixel, usize)>,
    moments: Moments,
    error: f64,
}

impl ColorBox {
    fn new(entries: Vec<(Pixel, usize)>) -> Self {
        let mut moments = Moments::default();
        for &(color, count) in &entries {
            moments.add(color, count);
        }
        Self {
            entries,
            moments,
            error: moments.squared_error(),
        }
    }

    fn can_split(&self) -> bool {
        self.entries.len() > 1
    }

    fn sort_along(&mut self, channel: usize) {
        self.entries
            .sort_by_key(|(color, _)| (color.channels()[channel], *color));
    }

    /// Split at the cut that leaves the least total squared error.
    ///
    /// Cuts are only placed between distinct values of the split channel,
    /// so the halves occupy disjoint value ranges there and their rounded
    /// means differ. Ties go to the lower channel (r, g, b) and then to the
    /// lower cut.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let mut best: Option<(f64, usize, usize)> = None;
        for channel in 0..3 {
            self.sort_along(channel);
            let mut lower = Moments::default();
            for i in 1..self.entries.len() {
                let (color, count) = self.entries[i - 1];
                lower.add(color, count);
                if color.channels()[channel] == self.entries[i].0.channels()[channel] {
                    continue;
                }
                let cost = lower.squared_error() + self.moments.minus(lower).squared_error();
                if best.is_none_or(|(c, _, _)| cost < c) {
                    best = Some((cost, channel, i));
                }
            }
        }

        let (_, channel, cut) = best.unwrap_or((0.0, 0, self.entries.len() / 2));
        tracing::trace!(channel, cut, error = self.error, "split box");
        self.sort_along(channel);
        let upper = self.entries.split_off(cut);
        (ColorBox::new(self.entries), ColorBox::new(upper))
    }

    fn swatch(&self) -> Swatch {
        let population = self.moments.weight as usize;
        Swatch {
            color: mean_color(self.moments.sum, population),
            population,
        }
    }
}

/// Greedy box splitting: always split the box with the largest squared
/// error until there are `k` boxes.
fn variance_cut(histogram: Vec<(Pixel, usize)>, k: usize) -> Palette {
    let mut boxes = vec![ColorBox::new(histogram)];

    while boxes.len() < k {
        let pick = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.can_split())
            .max_by(|(ia, a), (ib, b)| a.error.total_cmp(&b.error).then(ib.cmp(ia)))
            .map(|(i, _)| i);
        let Some(index) = pick else {
            break;
        };
        let (lower, upper) = boxes.remove(index).split();
        boxes.push(lower);
        boxes.push(upper);
    }

    Palette::from_swatches(boxes.iter().map(ColorBox::swatch).collect())
}

// ------------------------------------------------------------
// K-means
// ------------------------------------------------------------

fn kmeans(samples: &[Pixel], k: usize, max_iter: usize, seed: u64) -> Palette {
    let mut lab_pixels: Vec<Lab> = Vec::with_capacity(samples.len());
    for p in samples {
        let srgb = Srgb::<u8>::new(p.r, p.g, p.b);
        lab_pixels.push(srgb.into_linear().into_color());
    }

    let result = get_kmeans(k, max_iter, KMEANS_CONVERGENCE, false, &lab_pixels, seed);

    // Representatives come from the RGB samples, not the Lab centroids.
    let mut clusters = vec![([0u64; 3], 0usize); result.centroids.len()];
    for (p, &idx) in samples.iter().zip(&result.indices) {
        let Some((sums, count)) = clusters.get_mut(idx as usize) else {
            continue;
        };
        for (sum, v) in sums.iter_mut().zip(p.channels()) {
            *sum += u64::from(v);
        }
        *count += 1;
    }

    let mut merged: BTreeMap<Pixel, usize> = BTreeMap::new();
    for (sums, count) in clusters.into_iter().filter(|(_, n)| *n > 0) {
        *merged.entry(mean_color(sums, count)).or_default() += count;
    }

    Palette::from_swatches(
        merged
            .into_iter()
            .map(|(color, population)| Swatch { color, population })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RED: Pixel = Pixel::new(255, 0, 0);
    const BLUE: Pixel = Pixel::new(0, 0, 255);

    fn repeat(counts: &[(Pixel, usize)]) -> Vec<Pixel> {
        counts
            .iter()
            .flat_map(|&(p, n)| std::iter::repeat_n(p, n))
            .collect()
    }

    /// A deterministic spread of colors without any randomness source.
    fn noisy(n: usize) -> Vec<Pixel> {
        let mut state: u32 = 0x1234_5678;
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                let [r, g, b, _] = state.to_le_bytes();
                Pixel::new(r, g, b)
            })
            .collect()
    }

    #[test]
    fn tie_breaks_by_ascending_rgb() {
        let samples = vec![RED, RED, BLUE, BLUE];
        let palette = quantize(&samples, 2).unwrap();
        assert_eq!(
            palette.swatches(),
            &[
                Swatch { color: BLUE, population: 2 },
                Swatch { color: RED, population: 2 },
            ]
        );
    }

    #[test]
    fn orders_by_population() {
        let samples = repeat(&[(BLUE, 1), (RED, 3), (Pixel::new(0, 255, 0), 2)]);
        let palette = quantize(&samples, 5).unwrap();
        assert_eq!(
            palette.colors().collect::<Vec<_>>(),
            vec![RED, Pixel::new(0, 255, 0), BLUE]
        );
    }

    #[test]
    fn single_color_yields_one_entry() {
        let palette = quantize(&[RED; 50], 5).unwrap();
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.get(0), Some(RED));
    }

    #[test]
    fn empty_samples_are_invalid() {
        assert!(matches!(
            quantize(&[], 5),
            Err(GradientError::InvalidImage(_))
        ));
    }

    #[test]
    fn zero_k_is_invalid() {
        assert!(matches!(
            quantize(&[RED], 0),
            Err(GradientError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn variance_cut_length_is_min_of_k_and_distinct() {
        let samples = noisy(4000);
        for k in [1, 2, 3, 5, 8, 16] {
            let palette = quantize(&samples, k).unwrap();
            assert_eq!(palette.len(), k, "k = {k}");
        }
        let few = repeat(&[(RED, 3), (BLUE, 2), (Pixel::new(9, 9, 9), 1)]);
        assert_eq!(quantize(&few, 10).unwrap().len(), 3);
    }

    #[test]
    fn variance_cut_populations_are_sorted_and_complete() {
        let samples = noisy(2500);
        let palette = quantize(&samples, 7).unwrap();
        let pops: Vec<usize> = palette.swatches().iter().map(|s| s.population).collect();
        assert!(pops.windows(2).all(|w| w[0] >= w[1]), "{pops:?}");
        assert_eq!(pops.iter().sum::<usize>(), samples.len());
    }

    #[test]
    fn variance_cut_entries_are_distinct() {
        let samples = noisy(3000);
        let palette = quantize(&samples, 12).unwrap();
        let mut colors: Vec<Pixel> = palette.colors().collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), 12);
    }

    #[test]
    fn variance_cut_separates_clusters() {
        let dark_red = Pixel::new(200, 10, 10);
        let samples = repeat(&[(RED, 50), (dark_red, 10), (BLUE, 50), (Pixel::new(0, 0, 250), 10)]);
        let palette = quantize(&samples, 2).unwrap();
        // reds: (255*50 + 200*10) / 60 = 245.8, (10*10) / 60 = 1.7
        // blues: (255*50 + 250*10) / 60 = 254.2
        assert_eq!(
            palette.swatches(),
            &[
                Swatch { color: Pixel::new(0, 0, 254), population: 60 },
                Swatch { color: Pixel::new(246, 2, 2), population: 60 },
            ]
        );
    }

    #[test]
    fn mean_rounds_half_up() {
        assert_eq!(mean_color([1, 3, 5], 2), Pixel::new(1, 2, 3));
        assert_eq!(mean_color([510, 0, 255], 2), Pixel::new(255, 0, 128));
    }

    #[test]
    fn quantization_is_deterministic() {
        let samples = noisy(5000);
        assert_eq!(quantize(&samples, 5).unwrap(), quantize(&samples, 5).unwrap());
        let km = Quantizer::kmeans();
        assert_eq!(km.quantize(&samples, 5).unwrap(), km.quantize(&samples, 5).unwrap());
    }

    #[test]
    fn kmeans_palette_is_well_formed() {
        let samples = noisy(3000);
        let palette = Quantizer::kmeans().quantize(&samples, 6).unwrap();
        assert!((1..=6).contains(&palette.len()));
        let pops: Vec<usize> = palette.swatches().iter().map(|s| s.population).collect();
        assert!(pops.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(pops.iter().sum::<usize>(), samples.len());
    }

    #[test]
    fn kmeans_with_few_colors_is_exact() {
        let samples = repeat(&[(RED, 4), (BLUE, 1)]);
        let palette = Quantizer::kmeans().quantize(&samples, 5).unwrap();
        assert_eq!(palette.colors().collect::<Vec<_>>(), vec![RED, BLUE]);
    }

    #[test]
    fn kmeans_limits_are_validated() {
        let too_many = Quantizer::kmeans().validate(MAX_KMEANS_COLORS + 1);
        assert!(matches!(too_many, Err(GradientError::InvalidConfiguration(_))));
        let no_iter = Quantizer::KMeans { max_iter: 0, seed: 0 }.validate(3);
        assert!(matches!(no_iter, Err(GradientError::InvalidConfiguration(_))));
        assert!(Quantizer::VarianceCut.validate(1000).is_ok());
    }

    #[test]
    fn deserialized_palette_is_reordered() {
        let json = r##"[
            {"color": "#ff0000", "population": 1},
            {"color": "#00ff00", "population": 5},
            {"color": "#0000ff", "population": 5}
        ]"##;
        let palette: Palette = serde_json::from_str(json).unwrap();
        assert_eq!(
            palette.hex_codes(),
            vec!["#0000ff", "#00ff00", "#ff0000"]
        );

        let written = serde_json::to_string(&palette).unwrap();
        let again: Palette = serde_json::from_str(&written).unwrap();
        assert_eq!(again, palette);
    }

    #[test]
    fn hex_codes_follow_palette_order() {
        let palette = quantize(&repeat(&[(RED, 1), (BLUE, 2)]), 2).unwrap();
        assert_eq!(palette.hex_codes(), vec!["#0000ff", "#ff0000"]);
    }
}
