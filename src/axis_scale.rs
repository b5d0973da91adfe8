/// Axis scaling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisScale {
    /// Linear axis: plotted value is the raw data value.
    #[default]
    Linear,

    /// Base-10 logarithmic axis: plotted value is `log10(raw)`.
    ///
    /// Only strictly positive values are representable on this axis.
    Log,

    /// Categorical axis: raw values are category ordinals, plotted as-is.
    Categorical,
}

impl AxisScale {
    /// Transform a raw data value into plot-space.
    pub fn data_to_plot(self, value: f64) -> Option<f64> {
        match self {
            Self::Linear | Self::Categorical => value.is_finite().then_some(value),
            Self::Log => (value.is_finite() && value > 0.0)
                .then(|| value.log10())
                .filter(|v| v.is_finite()),
        }
    }

    /// Transform a plot-space value back into a raw data value.
    pub fn plot_to_data(self, value: f64) -> Option<f64> {
        match self {
            Self::Linear | Self::Categorical => value.is_finite().then_some(value),
            Self::Log => {
                if !value.is_finite() {
                    return None;
                }
                let out = 10.0_f64.powf(value);
                (out.is_finite() && out > 0.0).then_some(out)
            }
        }
    }

    /// Whether a raw value can be placed on this axis at all.
    pub fn accepts(self, value: f64) -> bool {
        self.data_to_plot(value).is_some()
    }
}
