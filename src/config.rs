use crate::{
    calibration::{CalibrationPoint, DisplayLimits},
    codec::{Reference, Resolution},
};

/// How calibration targets are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker<C> {
    pub radius: u32,
    pub foreground: C,
    /// Screen fill, also used to erase a marker.
    pub background: C,
}

/// Configuration for a [`Touch`](crate::Touch).
///
/// - `resolution`: Converter resolution
/// - `reference`: Reference mode used for every conversion
/// - `display_points`: The three calibration targets, in display pixels
/// - `limits`: Largest display coordinate on each axis; calibrated output is clamped to it
/// - `marker`: Size and colors of the calibration targets
/// - `filter`: Whether readings are smoothed by the moving average
/// - `calibration_timeout_ms`: Abandon a calibration when a target waits this long for a touch,
///   at most [`TIME_IN_STATE_LIMIT_MS`](crate::TIME_IN_STATE_LIMIT_MS)
///
/// # Examples
///
/// ```
/// use embedded_graphics::pixelcolor::BinaryColor;
/// use resistive_touch::{
///     calibration::{CalibrationPoint, DisplayLimits},
///     codec::{Reference, Resolution},
///     Config, Marker,
/// };
///
/// let config = Config {
///     resolution: Resolution::Bits12,
///     reference: Reference::Differential,
///     display_points: [
///         CalibrationPoint::new(40, 40),   // top left
///         CalibrationPoint::new(240, 280), // bottom middle
///         CalibrationPoint::new(440, 160), // right
///     ],
///     limits: DisplayLimits { max_x: 479, max_y: 319 },
///     marker: Marker {
///         radius: 8,
///         foreground: BinaryColor::On,
///         background: BinaryColor::Off,
///     },
///     filter: true,
///     calibration_timeout_ms: None, // wait for each target forever
/// };
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config<C> {
    pub resolution: Resolution,
    pub reference: Reference,
    pub display_points: [CalibrationPoint; 3],
    pub limits: DisplayLimits,
    pub marker: Marker<C>,
    pub filter: bool,
    pub calibration_timeout_ms: Option<u32>,
}

impl<C> Config<C> {
    /// 12-bit differential conversions, filtering on, no calibration
    /// timeout and targets from [`default_targets`].
    pub fn new(limits: DisplayLimits, marker: Marker<C>) -> Self {
        Self {
            resolution: Resolution::Bits12,
            reference: Reference::Differential,
            display_points: default_targets(limits),
            limits,
            marker,
            filter: true,
            calibration_timeout_ms: None,
        }
    }
}

/// Three targets spread over a quarter grid of the display. They are not
/// collinear as long as `max_x` and `max_y` are both at least 3; on smaller
/// displays they collapse onto one line.
///
/// ```text
/// +-------+-------+-------+-------+
/// |       |       |       |       |
/// +-------a-------+-------+-------+
/// |       |       |       |       |
/// +-------+-------+-------c-------+
/// |       |       |       |       |
/// +-------+-------b-------+-------+
/// |       |       |       |       |
/// +-------+-------+-------+-------+
/// ```
pub fn default_targets(limits: DisplayLimits) -> [CalibrationPoint; 3] {
    let x = (i64::from(limits.max_x) + 1) / 4;
    let y = (i64::from(limits.max_y) + 1) / 4;

    [
        CalibrationPoint::new(x, y),
        CalibrationPoint::new(2 * x, 3 * y),
        CalibrationPoint::new(3 * x, 2 * y),
    ]
}
