//! Choosing among candidate routes by similarity to the active one.

use std::collections::HashMap;

use wayfinder_core::Route;

/// Unrestricted Damerau–Levenshtein distance between `a` and `b`, in chars.
///
/// Insertions, deletions, substitutions and transpositions of adjacent
/// characters each cost one, and transposed characters may be edited again.
///
/// # Examples
///
/// ```
/// use wayfinder_session::reroute::damerau_levenshtein;
///
/// assert_eq!(damerau_levenshtein("Main St;Elm St", "Main St;Oak St"), 3);
/// assert_eq!(damerau_levenshtein("ca", "abc"), 2);
/// ```
#[must_use]
pub fn damerau_levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let ceiling = a_chars.len() + b_chars.len();
    let mut table = Table::new(a_chars.len() + 2, b_chars.len() + 2);

    table.set(0, 0, ceiling);
    for i in 0..=a_chars.len() {
        table.set(i + 1, 0, ceiling);
        table.set(i + 1, 1, i);
    }
    for j in 0..=b_chars.len() {
        table.set(0, j + 1, ceiling);
        table.set(1, j + 1, j);
    }

    let mut last_row: HashMap<char, usize> = HashMap::new();
    for (i, ca) in (1..).zip(&a_chars) {
        let mut last_match_col = 0;
        for (j, cb) in (1..).zip(&b_chars) {
            let k = last_row.get(cb).copied().unwrap_or(0);
            let l = last_match_col;
            let cost = if ca == cb {
                last_match_col = j;
                0
            } else {
                1
            };
            let best = (table.get(i, j) + cost)
                .min(table.get(i + 1, j) + 1)
                .min(table.get(i, j + 1) + 1)
                .min(table.get(k, l) + (i - k - 1) + 1 + (j - l - 1));
            table.set(i + 1, j + 1, best);
        }
        last_row.insert(*ca, i);
    }
    table.get(a_chars.len() + 1, b_chars.len() + 1)
}

/// Pick the route to adopt from `candidates`.
///
/// Without an active route the first candidate wins. Otherwise the candidate
/// whose joined leg summaries are closest to the active route's, by
/// [`damerau_levenshtein`], wins; ties go to the earlier candidate.
#[must_use]
pub fn select_route(active: Option<&Route>, candidates: Vec<Route>) -> Option<Route> {
    let Some(current) = active else {
        return candidates.into_iter().next();
    };
    if candidates.len() <= 1 {
        return candidates.into_iter().next();
    }
    let signature = current.leg_summary();
    candidates
        .into_iter()
        .min_by_key(|candidate| damerau_levenshtein(&signature, &candidate.leg_summary()))
}

/// Dense row-major table of edit costs.
struct Table {
    width: usize,
    cells: Vec<usize>,
}

impl Table {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            width: cols,
            cells: vec![0; rows * cols],
        }
    }

    fn get(&self, row: usize, col: usize) -> usize {
        self.cells
            .get(row * self.width + col)
            .copied()
            .unwrap_or_default()
    }

    fn set(&mut self, row: usize, col: usize, value: usize) {
        if let Some(cell) = self.cells.get_mut(row * self.width + col) {
            *cell = value;
        }
    }
}
