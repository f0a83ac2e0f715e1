//! Connected component labeling of packed masks.
//!
//! Foreground is read as horizontal runs straight from the mask words. Each
//! run is unioned with the touching runs of the row above, always keeping
//! the earlier run as root, so the root of a component is its first run in
//! raster order. Painting the runs in order then numbers components 1..N by
//! first appearance without a separate renumbering pass.


use crate::common::{BitBuffer2, Buffer2, LabelImage};
use crate::config::Connectivity;

/// Foreground pixels `start..end` of row `y`.
#[derive(Debug, Clone, Copy)]
struct Run {
    y: usize,
    start: usize,
    end: usize,
}

/// Label image produced by connected component analysis.
#[derive(Debug, Clone)]
pub struct LabelMap {
    labels: LabelImage,
    num_labels: usize,
}

impl LabelMap {
    /// Label the foreground of `mask`.
    pub fn from_mask(mask: &BitBuffer2, connectivity: Connectivity) -> Self {
        let width = mask.width();
        let height = mask.height();
        let mut labels = Buffer2::new_filled(width, height, 0u32);
        if width == 0 || height == 0 {
            return Self { labels, num_labels: 0 };
        }

        let runs = collect_runs(mask);
        let mut forest = RunForest::new(runs.len());

        // Runs are sorted by row, so each row is a contiguous slice.
        let mut prev = 0..0;
        let mut row_begin = 0;
        while row_begin < runs.len() {
            let y = runs[row_begin].y;
            let row_end = runs[row_begin..]
                .iter()
                .position(|r| r.y != y)
                .map_or(runs.len(), |n| row_begin + n);

            if prev.end > prev.start && runs[prev.start].y + 1 == y {
                link_rows(&runs, prev.clone(), row_begin..row_end, connectivity, &mut forest);
            }
            prev = row_begin..row_end;
            row_begin = row_end;
        }

        let mut run_labels = vec![0u32; runs.len()];
        let mut num_labels = 0u32;
        let pixels = labels.pixels_mut();
        for (i, run) in runs.iter().enumerate() {
            let root = forest.find(i);
            let label = if root == i {
                num_labels += 1;
                num_labels
            } else {
                run_labels[root]
            };
            run_labels[i] = label;
            let row = run.y * width;
            pixels[row + run.start..row + run.end].fill(label);
        }

        Self {
            labels,
            num_labels: num_labels as usize,
        }
    }

    /// Number of connected components (excluding background).
    #[inline]
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.labels.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.labels.height()
    }

    #[inline]
    pub fn labels(&self) -> &LabelImage {
        &self.labels
    }

    #[inline]
    pub fn into_image(self) -> LabelImage {
        self.labels
    }
}

impl std::ops::Index<(usize, usize)> for LabelMap {
    type Output = u32;

    #[inline]
    fn index(&self, xy: (usize, usize)) -> &Self::Output {
        &self.labels[xy]
    }
}

/// All foreground runs, in raster order.
fn collect_runs(mask: &BitBuffer2) -> Vec<Run> {
    let width = mask.width();
    let words_per_row = mask.words_per_row();
    let mut runs = Vec::new();

    for (y, row) in mask.words().chunks_exact(words_per_row).enumerate() {
        let mut open: Option<usize> = None;
        for (w, &word) in row.iter().enumerate() {
            let base = w * 64;
            let mut bit = 0u32;
            while bit < 64 {
                let rest = word >> bit;
                match open {
                    None => {
                        if rest == 0 {
                            break;
                        }
                        bit += rest.trailing_zeros();
                        open = Some(base + bit as usize);
                    }
                    Some(start) => {
                        bit += rest.trailing_ones();
                        if bit < 64 {
                            runs.push(Run {
                                y,
                                start,
                                end: base + bit as usize,
                            });
                            open = None;
                        }
                    }
                }
            }
        }
        // Padding bits are clear, so only a run reaching the last column stays open.
        if let Some(start) = open {
            runs.push(Run { y, start, end: width });
        }
    }

    runs
}

/// Union every run of `curr` with the runs of the row above that touch it.
fn link_rows(
    runs: &[Run],
    prev: std::ops::Range<usize>,
    curr: std::ops::Range<usize>,
    connectivity: Connectivity,
    forest: &mut RunForest,
) {
    // Diagonal neighbours widen each run by one column on both sides.
    let slack = match connectivity {
        Connectivity::Four => 0,
        Connectivity::Eight => 1,
    };

    let mut first = prev.start;
    for c in curr {
        let run = runs[c];
        while first < prev.end && runs[first].end + slack <= run.start {
            first += 1;
        }
        let mut p = first;
        while p < prev.end && runs[p].start < run.end + slack {
            forest.union(p, c);
            p += 1;
        }
    }
}

/// Union-find over run indices where the smaller index is always the root.
struct RunForest {
    parent: Vec<usize>,
}

impl RunForest {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            // Path halving.
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra < rb {
            self.parent[rb] = ra;
        } else if rb < ra {
            self.parent[ra] = rb;
        }
    }
}
