/// Fewest major intervals [`round_range`] yields. Not a search bound: the
/// 1/2/5 ladder never grows by more than 2.5x, so the finest step that fits
/// [`MAX_MAJOR_TICKS`] always leaves more than this many.
pub const MIN_MAJOR_TICKS: usize = 3;
/// Most major intervals a rounded axis may show.
pub const MAX_MAJOR_TICKS: usize = 8;
/// Minor ticks drawn between two major ticks, plus one.
pub const MINOR_DIVISIONS: usize = 5;

// Tolerance (in steps) when snapping bounds to a step multiple.
const SNAP_TOLERANCE: f64 = 1e-9;
const NICE_STEP_BASES: [f64; 4] = [1.0, 2.0, 5.0, 10.0];

/// The visual weight of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickWeight {
    Major,
    Minor,
}

/// A position along an axis where a grid line and tick label is placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// The value at this tick, in data coordinates.
    pub value: f64,

    /// The step size between major ticks, in plot-space.
    pub step_size: f64,

    /// The visual weight of the grid line at this tick.
    pub weight: TickWeight,

    /// Display text for categorical ticks.
    pub label: Option<String>,
}

impl Tick {
    pub fn new(value: f64, step_size: f64, weight: TickWeight) -> Self {
        Self {
            value,
            step_size,
            weight,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label if one is attached, otherwise the formatted value.
    pub fn text(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => default_formatter(self),
        }
    }
}

/// A default formatter that displays values with reasonable precision.
pub fn default_formatter(tick: &Tick) -> String {
    let log_step = tick.step_size.log10();
    if !log_step.is_finite() || log_step >= 0.0 {
        format!("{:.0}", tick.value)
    } else {
        let decimal_places = (-log_step).ceil() as usize;
        format!("{:.*}", decimal_places, tick.value)
    }
}

/// Smallest step of the form 1, 2 or 5 times a power of ten that is at least `raw`.
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let decade = 10.0_f64.powf(raw.log10().floor());
    NICE_STEP_BASES
        .iter()
        .map(|m| m * decade)
        .find(|&step| raw <= step)
        .unwrap_or(10.0 * decade)
}

// Next rung of the 1/2/5 ladder above `step`.
fn next_step(step: f64) -> f64 {
    nice_step(step * (1.0 + SNAP_TOLERANCE.sqrt()))
}

/// A range snapped outward to multiples of a nice step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl RoundedRange {
    /// Number of major intervals between `min` and `max`.
    pub fn intervals(&self) -> usize {
        ((self.max - self.min) / self.step).round() as usize
    }
}

/// Snap `[lo, hi]` outward to the finest 1/2/5 step that yields at most
/// [`MAX_MAJOR_TICKS`] intervals.
///
/// Returns `None` unless `lo < hi` and both are finite.
pub fn round_range(lo: f64, hi: f64) -> Option<RoundedRange> {
    let span = hi - lo;
    if !lo.is_finite() || !hi.is_finite() || !span.is_finite() || span <= 0.0 {
        return None;
    }
    let mut step = nice_step(span / MAX_MAJOR_TICKS as f64);
    // Snapping outward can add an interval at either end.
    let mut range = snap(lo, hi, step);
    while range.intervals() > MAX_MAJOR_TICKS {
        step = next_step(step);
        range = snap(lo, hi, step);
    }
    debug_assert!(range.intervals() >= MIN_MAJOR_TICKS, "{range:?}");
    Some(range)
}

/// Step that [`round_range`] would pick for `[lo, hi]`, without moving the bounds.
pub fn step_for(lo: f64, hi: f64) -> Option<f64> {
    round_range(lo, hi).map(|r| r.step)
}

fn snap(lo: f64, hi: f64, step: f64) -> RoundedRange {
    RoundedRange {
        min: (lo / step + SNAP_TOLERANCE).floor() * step,
        max: (hi / step - SNAP_TOLERANCE).ceil() * step,
        step,
    }
}

/// Major ticks at multiples of `step` within `[min, max]`, plus minor ticks
/// between them. Values are in plot-space.
pub fn linear_ticks(min: f64, max: f64, step: f64) -> Vec<Tick> {
    if !min.is_finite() || !max.is_finite() || min >= max || !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }
    let minor = step / MINOR_DIVISIONS as f64;
    let first = (min / minor - SNAP_TOLERANCE).ceil() as i64;
    let last = (max / minor + SNAP_TOLERANCE).floor() as i64;
    (first..=last)
        .map(|k| {
            let weight = if k.rem_euclid(MINOR_DIVISIONS as i64) == 0 {
                TickWeight::Major
            } else {
                TickWeight::Minor
            };
            Tick::new(k as f64 / MINOR_DIVISIONS as f64 * step, step, weight)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_step_picks_1_2_5() {
        assert_eq!(nice_step(0.7), 1.0);
        assert_eq!(nice_step(1.5), 2.0);
        assert_eq!(nice_step(3.0), 5.0);
        assert_eq!(nice_step(7.0), 10.0);
        assert_eq!(nice_step(-1.0), 1.0);
    }

    #[test]
    fn round_range_keeps_exact_bounds() {
        let r = round_range(0.0, 10.0).unwrap();
        assert_eq!((r.min, r.max, r.step), (0.0, 10.0, 2.0));
        assert_eq!(r.intervals(), 5);
    }

    #[test]
    fn round_range_snaps_outward() {
        let r = round_range(0.13, 0.97).unwrap();
        assert!(r.min <= 0.13 && r.max >= 0.97);
        assert!((r.step - 0.1).abs() < 1e-12 || (r.step - 0.2).abs() < 1e-12);
        assert!(r.intervals() >= MIN_MAJOR_TICKS && r.intervals() <= MAX_MAJOR_TICKS);

        let r = round_range(-1234.0, 5678.0).unwrap();
        assert!(r.min <= -1234.0 && r.max >= 5678.0);
        assert_eq!(r.step, 1000.0);
    }

    #[test]
    fn tick_window_holds_over_many_ranges() {
        for (lo, hi) in [(0.0, 1.0), (3.0, 3.5), (-7.0, 91.0), (1e-6, 3e-6), (1e5, 9.9e5)] {
            let r = round_range(lo, hi).unwrap();
            let n = r.intervals();
            assert!((MIN_MAJOR_TICKS..=MAX_MAJOR_TICKS).contains(&n), "{lo}..{hi}: {n}");
        }
    }

    #[test]
    fn steps_walk_the_ladder() {
        assert_eq!(next_step(1.0), 2.0);
        assert_eq!(next_step(2.0), 5.0);
        assert_eq!(next_step(5.0), 10.0);
        assert!((next_step(0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn round_range_widens_step_when_snapping_overflows() {
        // 8 intervals of 1 before snapping, 10 after.
        let r = round_range(0.5, 8.5).unwrap();
        assert_eq!(r.step, 2.0);
        assert_eq!((r.min, r.max), (0.0, 10.0));
    }

    #[test]
    fn degenerate_range_is_none() {
        assert!(round_range(2.0, 2.0).is_none());
        assert!(round_range(3.0, 2.0).is_none());
        assert!(round_range(f64::NAN, 2.0).is_none());
    }

    #[test]
    fn ticks_include_majors_at_bounds() {
        let ticks = linear_ticks(0.0, 10.0, 2.0);
        let majors: Vec<f64> = ticks
            .iter()
            .filter(|t| t.weight == TickWeight::Major)
            .map(|t| t.value)
            .collect();
        assert_eq!(majors, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks.len(), 26);
    }

    #[test]
    fn formatter_uses_step_precision() {
        assert_eq!(Tick::new(0.25, 0.05, TickWeight::Major).text(), "0.25");
        assert_eq!(Tick::new(1200.0, 100.0, TickWeight::Major).text(), "1200");
        assert_eq!(Tick::new(1.0, 1.0, TickWeight::Major).with_label("cat").text(), "cat");
    }
}
