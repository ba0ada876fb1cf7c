//! Weighted median-cut over histogram entries.
//!
//! Boxes are split along their widest channel at the weighted median until
//! the budget is reached or no box can be split further. Box priority is
//! weight times widest range, which favors splitting heavy, wide boxes
//! first and leaves small uniform regions alone.

/// One mean-color histogram entry and its pixel-count weight.
type Entry = ([f32; 4], f32);

struct ColorBox {
    entries: Vec<Entry>,
    weight: f32,
    ranges: [f32; 4],
}

impl ColorBox {
    fn new(entries: Vec<Entry>) -> Self {
        let weight = entries.iter().map(|(_, w)| w).sum();
        let mut mins = [f32::INFINITY; 4];
        let mut maxs = [f32::NEG_INFINITY; 4];
        for (color, _) in &entries {
            for c in 0..4 {
                mins[c] = mins[c].min(color[c]);
                maxs[c] = maxs[c].max(color[c]);
            }
        }
        let mut ranges = [0.0; 4];
        for c in 0..4 {
            ranges[c] = (maxs[c] - mins[c]).max(0.0);
        }
        Self { entries, weight, ranges }
    }

    fn widest_axis(&self) -> usize {
        let mut axis = 0;
        for c in 1..4 {
            if self.ranges[c] > self.ranges[axis] {
                axis = c;
            }
        }
        axis
    }

    fn priority(&self) -> f32 {
        self.weight * self.ranges[self.widest_axis()]
    }

    fn splittable(&self) -> bool {
        self.entries.len() > 1 && self.ranges[self.widest_axis()] > 0.0
    }

    /// Split at the weighted median along the widest axis. Both halves are
    /// guaranteed non-empty.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let axis = self.widest_axis();
        self.entries.sort_by(|a, b| {
            a.0[axis]
                .partial_cmp(&b.0[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let half = self.weight / 2.0;
        let mut acc = 0.0;
        let mut cut = 0;
        for (i, (_, w)) in self.entries.iter().enumerate() {
            acc += w;
            if acc >= half {
                cut = i + 1;
                break;
            }
        }
        // keep at least one entry on each side
        let cut = cut.clamp(1, self.entries.len() - 1);

        let right = self.entries.split_off(cut);
        (ColorBox::new(self.entries), ColorBox::new(right))
    }

    fn mean_color(&self) -> [f32; 4] {
        let mut sum = [0.0f64; 4];
        for (color, w) in &self.entries {
            for c in 0..4 {
                sum[c] += color[c] as f64 * *w as f64;
            }
        }
        let total = self.weight as f64;
        let mut out = [0.0f32; 4];
        for c in 0..4 {
            out[c] = (sum[c] / total) as f32;
        }
        out
    }
}

/// Reduce histogram entries to at most `max_colors` representative colors.
pub(crate) fn median_cut(entries: Vec<Entry>, max_colors: usize) -> Vec<[f32; 4]> {
    debug_assert!(max_colors >= 1);
    let mut boxes = vec![ColorBox::new(entries)];

    while boxes.len() < max_colors {
        // Pick the highest-priority splittable box. A linear scan is fine:
        // the box list is at most 256 long.
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.splittable())
            .max_by(|(_, a), (_, b)| {
                a.priority()
                    .partial_cmp(&b.priority())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i);

        let Some(index) = candidate else {
            break;
        };
        let (left, right) = boxes.swap_remove(index).split();
        boxes.push(left);
        boxes.push(right);
    }

    let mut colors: Vec<[f32; 4]> = boxes.iter().map(ColorBox::mean_color).collect();
    // Stable output order regardless of split sequence
    colors.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    colors
}
