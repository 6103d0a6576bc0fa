// Cost-based point removal for time series
use crate::domain::sample::Timestamped;

/// Reduces `points` to at most `count` entries, dropping the points whose
/// removal least distorts the tracked `fields`.
///
/// Each interior point is scored once against its original neighbours: the
/// squared difference between its value and the straight line through the
/// previous and next point, summed over every tracked field present on all
/// three. Costs are not recomputed as points are removed. The first and last
/// points are never candidates, so sequences of two or fewer points are
/// returned untouched and the result never drops below two points.
///
/// Equal costs keep their original order, so earlier points go first.
pub fn simplify_points<T: Timestamped>(points: Vec<T>, fields: &[&str], count: usize) -> Vec<T> {
    if points.len() <= count || points.len() <= 2 {
        return points;
    }

    let mut by_removal_cost: Vec<(usize, f64)> = (1..points.len() - 1)
        .map(|i| (i, removal_cost(&points[i - 1], &points[i], &points[i + 1], fields)))
        .collect();

    // sort_by is stable
    by_removal_cost.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut remove = vec![false; points.len()];
    for (index, _) in by_removal_cost.iter().take(points.len() - count) {
        remove[*index] = true;
    }

    points
        .into_iter()
        .zip(remove)
        .filter_map(|(point, removed)| (!removed).then_some(point))
        .collect()
}

fn removal_cost<T: Timestamped>(prev: &T, point: &T, next: &T, fields: &[&str]) -> f64 {
    let t = point.timestamp_ms();
    let t_prev = prev.timestamp_ms();
    let span = next.timestamp_ms() - t_prev;
    // Duplicate timestamps collapse the neighbour line onto `prev`.
    let ratio = if span == 0 {
        0.0
    } else {
        (t - t_prev) as f64 / span as f64
    };

    fields
        .iter()
        .filter_map(|name| {
            let actual = point.field(name)?;
            let before = prev.field(name)?;
            let after = next.field(name)?;
            let estimate = before + (after - before) * ratio;
            Some((actual - estimate) * (actual - estimate))
        })
        .sum()
}
