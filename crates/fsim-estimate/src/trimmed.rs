use crate::sample::Sample;

/// Leading fraction of the history treated as thermalisation and ignored.
pub const THROW_RATIO: f64 = 1.0 / 3.0;

/// Result of the trimmed-range analysis of a history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimmedRange<T> {
    /// Half the spread between the largest and smallest retained value, per component.
    pub error: T,
    /// Signed index distance between the maximum and the minimum, scaled by
    /// `(1 - THROW_RATIO) / len`.
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy)]
struct Extremes {
    min: f64,
    min_index: usize,
    max: f64,
    max_index: usize,
}

impl Extremes {
    fn gap(&self) -> i64 {
        self.max_index as i64 - self.min_index as i64
    }
}

/// Number of leading entries discarded from a history of length `len`.
pub fn discarded(len: usize) -> usize {
    len / 3
}

/// Runs the trimmed-range analysis. Returns `None` for an empty history.
///
/// Indices are absolute positions in `history`. The first occurrence of an
/// extreme value wins. For multi-component samples the ratio follows the
/// component with the largest signed index gap, the first one on ties.
pub fn trimmed_range<T: Sample>(history: &[T]) -> Option<TrimmedRange<T>> {
    let len = history.len();
    if len == 0 {
        return None;
    }
    let start = discarded(len);

    let extremes: Vec<Extremes> = (0..T::COMPONENTS)
        .map(|component| {
            let mut found = Extremes {
                min: f64::MAX,
                min_index: 0,
                max: f64::MIN,
                max_index: 0,
            };
            for (index, value) in history.iter().enumerate().skip(start) {
                let value = value.component(component);
                if value < found.min {
                    found.min = value;
                    found.min_index = index;
                }
                if value > found.max {
                    found.max = value;
                    found.max_index = index;
                }
            }
            found
        })
        .collect();

    let errors: Vec<f64> = extremes
        .iter()
        .map(|e| (e.max - e.min).abs() / 2.0)
        .collect();
    let mut gap = extremes[0].gap();
    for e in &extremes[1..] {
        if e.gap() > gap {
            gap = e.gap();
        }
    }

    Some(TrimmedRange {
        error: T::from_components(&errors),
        ratio: gap as f64 / len as f64 * (1.0 - THROW_RATIO),
    })
}
