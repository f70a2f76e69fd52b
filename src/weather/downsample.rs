//! Nearest-stride downsampling for chart rendering.
//!
//! Deterministic index selection, not a statistical resample: skipped rows
//! are dropped, never averaged. Cheap single-pass selection is what chart
//! rendering needs; exact aggregates come from the stats path instead.

/// Reduce `rows` to at most `max_points` elements, preserving order.
///
/// The first selected index is always 0. The last selected index is
/// `floor((max_points - 1) * step)`, which is not necessarily the final row.
pub fn downsample<T>(rows: Vec<T>, max_points: usize) -> Vec<T> {
    if max_points == 0 {
        return Vec::new();
    }
    if rows.len() <= max_points {
        return rows;
    }

    let step = rows.len() as f64 / max_points as f64;
    let picks: Vec<usize> = (0..max_points).map(|i| (i as f64 * step) as usize).collect();

    let mut picks_iter = picks.into_iter().peekable();
    rows.into_iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            if picks_iter.peek() == Some(&idx) {
                picks_iter.next();
                Some(row)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_returned_unchanged() {
        let rows = vec![1, 2, 3];
        assert_eq!(downsample(rows.clone(), 5), rows);
        assert_eq!(downsample(rows.clone(), 3), rows);
    }

    #[test]
    fn output_is_capped_and_ordered() {
        let rows: Vec<i64> = (0..12).collect();
        let out = downsample(rows, 5);
        assert_eq!(out.len(), 5);
        assert!(out.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn first_element_is_always_the_first_row() {
        for n in [10usize, 100, 1000] {
            let rows: Vec<usize> = (0..n).collect();
            let out = downsample(rows, 7);
            assert_eq!(out[0], 0);
        }
    }

    #[test]
    fn stride_indexes_match_the_floor_formula() {
        // N = 12, max = 5: step = 2.4, picks 0, 2, 4, 7, 9.
        let rows: Vec<i64> = (0..12).collect();
        assert_eq!(downsample(rows, 5), vec![0, 2, 4, 7, 9]);
    }

    #[test]
    fn last_row_is_not_special_cased() {
        // N = 10, max = 3: step = 3.33..., picks 0, 3, 6 — not index 9.
        let rows: Vec<i64> = (0..10).collect();
        assert_eq!(downsample(rows, 3), vec![0, 3, 6]);
    }

    #[test]
    fn zero_cap_yields_empty() {
        let rows: Vec<i64> = (0..4).collect();
        assert!(downsample(rows, 0).is_empty());
    }
}
