use rand::Rng;

/// Picks an action with probability proportional to its weight.
///
/// The draw is uniform in `[0, total)` and the first action whose cumulative
/// weight exceeds it wins, so zero-weight actions are never picked. When the
/// total is not positive the first action is returned. Returns `None` only
/// for an empty list.
pub fn select_weighted<T: Copy, R: Rng + ?Sized>(options: &[(f64, T)], rng: &mut R) -> Option<T> {
    let (_, first) = options.first()?;
    let total: f64 = options.iter().map(|(w, _)| w.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return Some(*first);
    }

    let draw = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (weight, action) in options {
        cumulative += weight.max(0.0);
        if draw < cumulative {
            return Some(*action);
        }
    }

    // Rounding left the draw past the last boundary.
    options.iter().rev().find(|(w, _)| *w > 0.0).map(|(_, action)| *action)
}
