use indexmap::IndexMap;

use crate::error::{PlotError, Result};

/// Default ordinal of the first category.
pub const DEFAULT_CATEGORY_ORIGIN: f64 = 0.0;
/// Default spacing between consecutive category ordinals.
pub const DEFAULT_CATEGORY_STEP: f64 = 1.0;

/// Ordered bijection between category labels and axis ordinals.
///
/// Labels are kept sorted; the `k`-th label sits at `origin + k * step`.
/// Registering a label that sorts before existing ones renumbers everything
/// after it, so callers holding ordinals must map their labels again.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMap {
    labels: IndexMap<String, f64>,
    origin: f64,
    step: f64,
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self {
            labels: IndexMap::new(),
            origin: DEFAULT_CATEGORY_ORIGIN,
            step: DEFAULT_CATEGORY_STEP,
        }
    }
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from arbitrary (possibly repeated, unsorted) labels.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut map = Self::new();
        map.register(labels);
        map
    }

    /// Add labels, then re-sort and renumber the whole set.
    ///
    /// Returns true if any new label was seen.
    pub fn register<S: AsRef<str>>(&mut self, labels: &[S]) -> bool {
        let mut added = false;
        for label in labels {
            let label = label.as_ref();
            if !self.labels.contains_key(label) {
                self.labels.insert(label.to_owned(), 0.0);
                added = true;
            }
        }
        if added {
            self.labels.sort_keys();
            self.renumber();
        }
        added
    }

    /// Change the ordinal layout. `step` must be non-zero and finite.
    pub fn set_layout(&mut self, origin: f64, step: f64) -> Result<()> {
        if !origin.is_finite() || !step.is_finite() || step == 0.0 {
            return Err(PlotError::dimension(format!(
                "category layout needs a finite origin and non-zero step, got {origin} / {step}"
            )));
        }
        self.origin = origin;
        self.step = step;
        self.renumber();
        Ok(())
    }

    fn renumber(&mut self) {
        let (origin, step) = (self.origin, self.step);
        for (k, ordinal) in self.labels.values_mut().enumerate() {
            *ordinal = origin + k as f64 * step;
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Ordinal assigned to `label`.
    pub fn ordinal(&self, label: &str) -> Option<f64> {
        self.labels.get(label).copied()
    }

    /// Label whose ordinal is nearest to `value`, if `value` lies within half a
    /// step of the occupied range.
    pub fn label_at(&self, value: f64) -> Option<&str> {
        if self.labels.is_empty() || !value.is_finite() {
            return None;
        }
        let k = ((value - self.origin) / self.step).round();
        if k < 0.0 || k >= self.labels.len() as f64 {
            return None;
        }
        self.labels
            .get_index(k as usize)
            .map(|(label, _)| label.as_str())
    }

    /// `(first, last)` ordinal, if any label is registered.
    pub fn extent(&self) -> Option<(f64, f64)> {
        let first = *self.labels.first()?.1;
        let last = *self.labels.last()?.1;
        Some((first.min(last), first.max(last)))
    }

    /// Labels paired with their ordinals, in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels.iter().map(|(l, &o)| (l.as_str(), o))
    }
}
