//! Render-time settings of a synthesizer instance.

use super::Float;
use super::synth_params::SynthParams;

pub const LINE_WIDTH_MIN: Float = 1.0;
pub const LINE_WIDTH_MAX: Float = 5.0;

/// Settings only the graph drawing cares about. They are kept here so that
/// they survive a preset round trip.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayFlags {
    pub hide_dividers: bool,
    pub hide_endpoints: bool,
    pub hide_graph: bool,
    pub hide_grid_dots: bool,
    pub hide_offset: bool,
    pub line_width: Float,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        DisplayFlags {
            hide_dividers: false,
            hide_endpoints: false,
            hide_graph: false,
            hide_grid_dots: false,
            hide_offset: false,
            line_width: 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SynthConfig {
    pub periods: usize,     // Number of fundamental periods shown
    pub gain: Float,        // Linear gain, [0, gain_max]
    pub auto_adjust: bool,  // Normalize gain and DC offset after sampling
    pub display: DisplayFlags,
}

impl SynthConfig {
    pub fn new(params: &SynthParams) -> SynthConfig {
        let params = params.sanitized();
        SynthConfig {
            periods: params.clamp_periods(3),
            gain: params.default_gain,
            auto_adjust: false,
            display: DisplayFlags::default(),
        }
    }

    /// Half the line width, the margin a stroke needs to stay inside the graph.
    pub fn stroke_margin(&self) -> Float {
        num::clamp(self.display.line_width, LINE_WIDTH_MIN, LINE_WIDTH_MAX) / 2.0
    }
}
