//! One-step dilation of packed masks with the 3x3 structuring element.


use rayon::prelude::*;

use crate::common::BitBuffer2;

/// Every pixel that is set in `mask` or has a set 8-neighbour.
///
/// Each row is first widened by one column on both sides, carrying bits
/// across word boundaries, then each output row ORs the widened rows above,
/// at and below it. Pixels outside the image count as background.
pub fn dilate8(mask: &BitBuffer2) -> BitBuffer2 {
    let mut output = BitBuffer2::new_default(mask.width(), mask.height());
    let words_per_row = mask.words_per_row();
    if words_per_row == 0 || mask.height() == 0 {
        return output;
    }
    let tail_mask = mask.tail_mask();

    let mut widened = vec![0u64; mask.num_words()];
    widened
        .par_chunks_mut(words_per_row)
        .zip(mask.words().par_chunks(words_per_row))
        .for_each(|(out_row, in_row)| {
            for (i, out) in out_row.iter_mut().enumerate() {
                let word = in_row[i];
                let from_left = if i > 0 { in_row[i - 1] >> 63 } else { 0 };
                let from_right = in_row.get(i + 1).map_or(0, |next| next << 63);
                *out = word | (word << 1) | (word >> 1) | from_left | from_right;
            }
            out_row[words_per_row - 1] &= tail_mask;
        });

    let height = mask.height();
    output
        .words_mut()
        .par_chunks_mut(words_per_row)
        .enumerate()
        .for_each(|(y, out_row)| {
            for src_y in y.saturating_sub(1)..=(y + 1).min(height - 1) {
                let src = &widened[src_y * words_per_row..(src_y + 1) * words_per_row];
                for (out, &word) in out_row.iter_mut().zip(src) {
                    *out |= word;
                }
            }
        });

    output
}
