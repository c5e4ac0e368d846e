/// Decides whether a piece of curve is straight enough to become one polygon. `curve_span` is
/// how much curve parameter the piece covers and `chord` the straight-line distance between its
/// ends.
///
/// The comparison isn't dimensionally consistent; it's a tuned heuristic. On a straight piece it
/// reduces to `curve_span^2 <= max_poly_size * curve_span`, capping length at `max_poly_size`.
/// Bends shrink the chord relative to the span, forcing more splits.
pub fn span_is_flat(curve_span: f64, chord: f64, max_poly_size: f64) -> bool {
    if chord < CHORD_EPSILON || curve_span <= 0.0 {
        return true;
    }
    curve_span <= max_poly_size * chord / curve_span
}

const CHORD_EPSILON: f64 = 1e-6;
/// A piece is never split more than this many times.
const MAX_DEPTH: usize = 16;

/// Splits [0, 1] into consecutive pieces by repeated bisection until `is_flat` accepts each
/// piece, returning them in order. `is_flat` receives the fractions bounding a piece.
pub fn subdivide<F: FnMut(f64, f64) -> bool>(mut is_flat: F) -> Vec<(f64, f64)> {
    let mut pieces = Vec::new();
    // Pop the left half first, so pieces come out in order
    let mut stack = vec![(0.0, 1.0, 0)];
    while let Some((s0, s1, depth)) = stack.pop() {
        if depth >= MAX_DEPTH || is_flat(s0, s1) {
            pieces.push((s0, s1));
            continue;
        }
        let mid = (s0 + s1) / 2.0;
        stack.push((mid, s1, depth + 1));
        stack.push((s0, mid, depth + 1));
    }
    pieces
}
