//! Three-point affine calibration.
//!
//! Three display targets and the raw touch readings taken on them determine
//! the map from touch space to display space:
//!
//! ```text
//! f0 * Dx = f1 * Tx + f2 * Ty + f3
//! f0 * Dy = f4 * Tx + f5 * Ty + f6
//! ```
//!
//! The factors come from a closed-form determinant expansion over the three
//! point pairs, see "Calibration in touch-screen systems" (TI, SLYT277).

/// A point in display or raw touch coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalibrationPoint {
    pub x: i64,
    pub y: i64,
}

impl CalibrationPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Largest valid display coordinate on each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayLimits {
    pub max_x: u16,
    pub max_y: u16,
}

/// The seven calibration factors `f0..=f6`.
///
/// `f0` is the shared denominator and is never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coefficients([i64; 7]);

impl Coefficients {
    /// Restores previously computed factors, e.g. from non-volatile storage.
    /// Returns `None` if the denominator `f0` is zero.
    pub const fn new(factors: [i64; 7]) -> Option<Self> {
        if factors[0] == 0 {
            None
        } else {
            Some(Self(factors))
        }
    }

    /// The factors, for persisting them.
    pub const fn factors(&self) -> [i64; 7] {
        self.0
    }
}

/// Solves the calibration factors for three display/touch pairs.
///
/// Returns `None` when the touch points are collinear, which leaves the
/// system without a solution.
pub fn compute_coefficients(
    display: &[CalibrationPoint; 3],
    touch: &[CalibrationPoint; 3],
) -> Option<Coefficients> {
    let [d0, d1, d2] = *display;
    let [t0, t1, t2] = *touch;

    let f0 = (t0.x - t2.x) * (t1.y - t2.y) - (t1.x - t2.x) * (t0.y - t2.y);

    let f1 = (d0.x - d2.x) * (t1.y - t2.y) - (d1.x - d2.x) * (t0.y - t2.y);
    let f2 = (t0.x - t2.x) * (d1.x - d2.x) - (d0.x - d2.x) * (t1.x - t2.x);
    let f3 = t0.y * (t2.x * d1.x - t1.x * d2.x)
        + t1.y * (t0.x * d2.x - t2.x * d0.x)
        + t2.y * (t1.x * d0.x - t0.x * d1.x);

    let f4 = (d0.y - d2.y) * (t1.y - t2.y) - (d1.y - d2.y) * (t0.y - t2.y);
    let f5 = (t0.x - t2.x) * (d1.y - d2.y) - (d0.y - d2.y) * (t1.x - t2.x);
    let f6 = t0.y * (t2.x * d1.y - t1.x * d2.y)
        + t1.y * (t0.x * d2.y - t2.x * d0.y)
        + t2.y * (t1.x * d0.y - t0.x * d1.y);

    Coefficients::new([f0, f1, f2, f3, f4, f5, f6])
}

/// Maps a raw touch reading to display coordinates, clamped to `limits`.
///
/// Division truncates toward zero. Any factor set is accepted: the products
/// are formed in 128 bits, where they cannot overflow.
///
/// # Examples
///
/// ```
/// use resistive_touch::calibration::{apply, compute_coefficients, CalibrationPoint, DisplayLimits};
///
/// let display = [
///     CalibrationPoint::new(20, 20),
///     CalibrationPoint::new(300, 120),
///     CalibrationPoint::new(160, 220),
/// ];
/// // Touch readings are twice the display position plus 100.
/// let touch = display.map(|p| CalibrationPoint::new(2 * p.x + 100, 2 * p.y + 100));
/// let coefficients = compute_coefficients(&display, &touch).unwrap();
/// let limits = DisplayLimits { max_x: 319, max_y: 239 };
///
/// assert_eq!(apply(700, 340, &coefficients, limits), (300, 120));
/// assert_eq!(apply(4095, 0, &coefficients, limits), (319, 0));
/// ```
pub fn apply(raw_x: u16, raw_y: u16, coefficients: &Coefficients, limits: DisplayLimits) -> (u16, u16) {
    let [f0, f1, f2, f3, f4, f5, f6] = coefficients.0.map(i128::from);
    let (tx, ty) = (i128::from(raw_x), i128::from(raw_y));

    let x = (f1 * tx + f2 * ty + f3) / f0;
    let y = (f4 * tx + f5 * ty + f6) / f0;

    (clamp(x, limits.max_x), clamp(y, limits.max_y))
}

fn clamp(value: i128, max: u16) -> u16 {
    // In 0..=max after clamping, so the cast is lossless.
    value.clamp(0, i128::from(max)) as u16
}
