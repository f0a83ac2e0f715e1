//! Bit-packed 2D buffer for boolean masks.
//!
//! Each row starts on a fresh `u64` word so row-wise scans (run extraction,
//! dilation) can work directly on words. Padding bits past `width` are
//! always zero; every mutating operation preserves that.

use std::ops::Index;

/// Number of bits per storage word.
const BITS_PER_WORD: usize = 64;

/// A 2D boolean mask stored as row-aligned packed bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer2 {
    words: Vec<u64>,
    width: usize,
    height: usize,
    words_per_row: usize,
}

impl BitBuffer2 {
    /// Create a new mask filled with the given value.
    pub fn new_filled(width: usize, height: usize, value: bool) -> Self {
        let words_per_row = width.div_ceil(BITS_PER_WORD);
        let mut buf = Self {
            words: vec![0u64; words_per_row * height],
            width,
            height,
            words_per_row,
        };
        if value {
            buf.fill(true);
        }
        buf
    }

    /// Create a new mask with all bits cleared.
    #[inline]
    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, false)
    }

    /// Create a mask from a row-major slice of booleans.
    pub fn from_slice(width: usize, height: usize, data: &[bool]) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "data length {} does not match dimensions {}x{}",
            data.len(),
            width,
            height
        );
        Self::from_fn(width, height, |x, y| data[y * width + x])
    }

    /// Create a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut buf = Self::new_default(width, height);
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    buf.set_xy(x, y, true);
                }
            }
        }
        buf
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `u64` words backing one row.
    #[inline]
    pub fn words_per_row(&self) -> usize {
        self.words_per_row
    }

    #[inline]
    fn word_bit(&self, x: usize, y: usize) -> (usize, usize) {
        (y * self.words_per_row + x / BITS_PER_WORD, x % BITS_PER_WORD)
    }

    /// Get a bit by row-major pixel index (`y * width + x`).
    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len());
        self.get_xy(idx % self.width, idx / self.width)
    }

    /// Set a bit by row-major pixel index (`y * width + x`).
    #[inline]
    pub fn set(&mut self, idx: usize, value: bool) {
        debug_assert!(idx < self.len());
        let width = self.width;
        self.set_xy(idx % width, idx / width, value);
    }

    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        let (word, bit) = self.word_bit(x, y);
        (self.words[word] >> bit) & 1 != 0
    }

    #[inline]
    pub fn set_xy(&mut self, x: usize, y: usize, value: bool) {
        debug_assert!(x < self.width && y < self.height);
        let (word, bit) = self.word_bit(x, y);
        if value {
            self.words[word] |= 1u64 << bit;
        } else {
            self.words[word] &= !(1u64 << bit);
        }
    }

    /// Set every bit in `x_start..=x_end` on row `y`.
    pub fn set_span(&mut self, y: usize, x_start: usize, x_end: usize) {
        debug_assert!(x_start <= x_end && x_end < self.width && y < self.height);
        for x in x_start..=x_end {
            let (word, bit) = self.word_bit(x, y);
            self.words[word] |= 1u64 << bit;
        }
    }

    /// Fill all pixels with the given value, keeping padding bits clear.
    pub fn fill(&mut self, value: bool) {
        if !value {
            self.words.fill(0);
            return;
        }
        self.words.fill(!0u64);
        let tail_mask = self.tail_mask();
        if self.words_per_row > 0 {
            for y in 0..self.height {
                self.words[y * self.words_per_row + self.words_per_row - 1] &= tail_mask;
            }
        }
    }

    /// Mask of the valid bits in the last word of each row.
    #[inline]
    pub fn tail_mask(&self) -> u64 {
        match self.width % BITS_PER_WORD {
            0 => !0u64,
            rem => (1u64 << rem) - 1,
        }
    }

    /// Underlying row-aligned words in LSB-first bit order.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Mutable access to the words. Callers must keep padding bits clear.
    #[inline]
    pub fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.assert_same_shape(other);
        self.words.copy_from_slice(&other.words);
    }

    /// Number of set pixels.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True when no pixel is set.
    #[inline]
    pub fn none(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// In-place intersection.
    pub fn and_assign(&mut self, other: &Self) {
        self.assert_same_shape(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= b;
        }
    }

    /// In-place union.
    pub fn or_assign(&mut self, other: &Self) {
        self.assert_same_shape(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
    }

    /// In-place difference (`self & !other`).
    pub fn and_not_assign(&mut self, other: &Self) {
        self.assert_same_shape(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !b;
        }
    }

    /// New mask holding `self & other`.
    pub fn and(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.and_assign(other);
        out
    }

    fn assert_same_shape(&self, other: &Self) {
        assert_eq!(self.width, other.width, "width mismatch");
        assert_eq!(self.height, other.height, "height mismatch");
    }

    /// Iterate over all pixel values in row-major order.
    #[inline]
    pub fn iter(&self) -> BitIter<'_> {
        BitIter {
            buffer: self,
            idx: 0,
        }
    }

    /// Iterate over `(x, y)` of set pixels in row-major order, skipping empty words.
    pub fn iter_ones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let wpr = self.words_per_row;
        self.words.iter().enumerate().flat_map(move |(word_idx, &word)| {
            let y = word_idx / wpr.max(1);
            let base_x = (word_idx % wpr.max(1)) * BITS_PER_WORD;
            SetBits(word).map(move |bit| (base_x + bit, y))
        })
    }
}

/// Iterator over the set bit positions of a single word.
struct SetBits(u64);

impl Iterator for SetBits {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(bit)
    }
}

impl Index<(usize, usize)> for BitBuffer2 {
    type Output = bool;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        if self.get_xy(x, y) {
            &true
        } else {
            &false
        }
    }
}

impl From<&BitBuffer2> for Vec<bool> {
    #[inline]
    fn from(buf: &BitBuffer2) -> Self {
        buf.iter().collect()
    }
}

/// Iterator over pixel values in row-major order.
pub struct BitIter<'a> {
    buffer: &'a BitBuffer2,
    idx: usize,
}

impl Iterator for BitIter<'_> {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx < self.buffer.len() {
            let value = self.buffer.get(self.idx);
            self.idx += 1;
            Some(value)
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len() - self.idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitIter<'_> {}
