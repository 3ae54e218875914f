use crate::image::GrayPlane;

/// 8-neighborhood offsets `(dx, dy)`. Order is clockwise starting at the
/// upper-left neighbor:
///
/// <pre>
/// 0  1  2
/// 7  c  3
/// 6  5  4
/// </pre>
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Center-symmetric pairs as indices into [`NEIGHBOR_OFFSETS`]:
/// (top-left, bottom-right), (top, bottom), (top-right, bottom-left),
/// (right, left).
pub const SYMMETRIC_PAIRS: [(usize, usize); 4] = [(0, 4), (1, 5), (2, 6), (3, 7)];

/// Number of interior pixels (pixels with a full 8-neighborhood).
#[inline]
pub fn interior_count(width: usize, height: usize) -> usize {
    width.saturating_sub(2) * height.saturating_sub(2)
}

/// Call `f(center, ring)` for every interior pixel in row-major order.
///
/// Border pixels are never centers, so every neighbor read is in bounds.
/// Images narrower or shorter than 3 pixels have no interior.
pub fn for_each_interior<F>(gray: &GrayPlane, mut f: F)
where
    F: FnMut(u8, &[u8; 8]),
{
    let (w, h) = (gray.width(), gray.height());
    if w < 3 || h < 3 {
        return;
    }
    for y in 1..h - 1 {
        let last = gray.row(y - 1);
        let this = gray.row(y);
        let next = gray.row(y + 1);
        for x in 1..w - 1 {
            let ring = [
                last[x - 1],
                last[x],
                last[x + 1],
                this[x + 1],
                next[x + 1],
                next[x],
                next[x - 1],
                this[x - 1],
            ];
            f(this[x], &ring);
        }
    }
}

/// Neighbors of the interior pixel `(x, y)` in [`NEIGHBOR_OFFSETS`] order.
///
/// Panics if `(x, y)` lies on the border.
pub fn sample(gray: &GrayPlane, x: usize, y: usize) -> [u8; 8] {
    assert!(
        x >= 1 && y >= 1 && x + 1 < gray.width() && y + 1 < gray.height(),
        "({x}, {y}) is not an interior pixel of a {}x{} image",
        gray.width(),
        gray.height()
    );
    let mut ring = [0u8; 8];
    for (slot, &(dx, dy)) in ring.iter_mut().zip(NEIGHBOR_OFFSETS.iter()) {
        let xx = (x as isize + dx) as usize;
        let yy = (y as isize + dy) as usize;
        *slot = gray.at(xx, yy);
    }
    ring
}
