//! Moore-neighbour tracing of a component's outer boundary.

use crate::common::LabelImage;
use crate::math::Aabb;

/// Neighbour offsets, clockwise on screen (y down), starting east.
const DIRECTIONS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const WEST: usize = 4;

/// Outer boundary pixels of the component `label`, clockwise from its
/// top-left-most pixel.
///
/// `bbox` must enclose the component. A single pixel yields one point.
/// Returns an empty vector if `label` does not occur inside `bbox`.
pub fn trace_outer_contour(labels: &LabelImage, label: u32, bbox: &Aabb) -> Vec<[usize; 2]> {
    let Some(start) = first_pixel(labels, label, bbox) else {
        return Vec::new();
    };

    let mut points = vec![[start.0, start.1]];

    // Nothing west, north-west, north or north-east of the first raster pixel
    // belongs to the component, so the search may start from the west.
    let Some(first_dir) = next_direction(labels, label, start, WEST) else {
        return points;
    };

    let max_steps = 4 * bbox.area() + 8;
    let mut pos = start;
    let mut dir = first_dir;

    for _ in 0..max_steps {
        pos = step(pos, dir);
        let Some(next) = next_direction(labels, label, pos, backtrack(dir)) else {
            break;
        };
        // Jacob's stopping criterion: back at the start, about to repeat the first move.
        if pos == start && next == first_dir {
            break;
        }
        points.push([pos.0, pos.1]);
        dir = next;
    }

    points
}

fn first_pixel(labels: &LabelImage, label: u32, bbox: &Aabb) -> Option<(usize, usize)> {
    (bbox.y_min..=bbox.y_max)
        .flat_map(|y| (bbox.x_min..=bbox.x_max).map(move |x| (x, y)))
        .find(|&(x, y)| labels[(x, y)] == label)
}

/// Direction of the background pixel checked just before moving along `dir`,
/// seen from the pixel we moved to.
#[inline]
fn backtrack(dir: usize) -> usize {
    if dir % 2 == 0 {
        (dir + 6) % 8
    } else {
        (dir + 5) % 8
    }
}

#[inline]
fn step(pos: (usize, usize), dir: usize) -> (usize, usize) {
    let (dx, dy) = DIRECTIONS[dir];
    (
        pos.0.wrapping_add_signed(dx),
        pos.1.wrapping_add_signed(dy),
    )
}

/// First clockwise direction from `start_dir` leading to a component pixel.
fn next_direction(labels: &LabelImage, label: u32, pos: (usize, usize), start_dir: usize) -> Option<usize> {
    (0..8).map(|k| (start_dir + k) % 8).find(|&d| {
        let (x, y) = step(pos, d);
        x < labels.width() && y < labels.height() && labels[(x, y)] == label
    })
}
