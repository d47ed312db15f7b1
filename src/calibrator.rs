use crate::{
    acquire::Sample,
    calibration::{compute_coefficients, CalibrationPoint, Coefficients},
    config::Marker,
    error::CalibrationFailure,
    fsm::{CalibrationFsm, State, TIME_IN_STATE_LIMIT_MS},
};
use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::Point,
    pixelcolor::PixelColor,
    primitives::{Circle, Primitive, PrimitiveStyle},
    Drawable,
};

/// Calibration progress as seen by the application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalibrationStatus {
    /// A start was requested and not yet picked up.
    pub requested: bool,
    /// Targets are shown or factors are being computed.
    pub in_progress: bool,
    /// Coefficients are available, computed or restored.
    pub done: bool,
    /// Outcome of the last run, if it failed.
    pub failure: Option<CalibrationFailure>,
}

/// Runs the three-target calibration sequence: shows a marker per target,
/// records the raw reading while it is pressed, moves on when released and
/// finally computes the [`Coefficients`].
#[derive(Debug)]
pub struct Calibrator<C> {
    fsm: CalibrationFsm,
    display_points: [CalibrationPoint; 3],
    touch_points: [CalibrationPoint; 3],
    coefficients: Option<Coefficients>,
    requested: bool,
    in_progress: bool,
    failure: Option<CalibrationFailure>,
    touched: bool,
    marker: Marker<C>,
    timeout_ms: Option<u32>,
}

impl<C> Calibrator<C>
where
    C: PixelColor,
{
    /// Returns an idle calibrator for the given targets.
    ///
    /// `timeout_ms` is capped at [`TIME_IN_STATE_LIMIT_MS`], the longest time
    /// in state that is tracked.
    pub fn new(display_points: [CalibrationPoint; 3], marker: Marker<C>, timeout_ms: Option<u32>) -> Self {
        let timeout_ms = timeout_ms.map(|timeout_ms| {
            if timeout_ms > TIME_IN_STATE_LIMIT_MS {
                log::warn!(
                    "calibration timeout {} ms capped to {} ms",
                    timeout_ms,
                    TIME_IN_STATE_LIMIT_MS
                );
            }
            timeout_ms.min(TIME_IN_STATE_LIMIT_MS)
        });

        Self {
            fsm: CalibrationFsm::new(),
            display_points,
            touch_points: [CalibrationPoint::default(); 3],
            coefficients: None,
            requested: false,
            in_progress: false,
            failure: None,
            touched: false,
            marker,
            timeout_ms,
        }
    }

    /// Puts the sequence back to idle.
    pub fn reset(&mut self) {
        self.fsm.reset();
    }

    /// Arms a calibration run; it starts on the next [`step`](Calibrator::step).
    pub fn request(&mut self) {
        self.requested = true;
    }

    /// Snapshot of the request, progress and outcome flags.
    pub fn status(&self) -> CalibrationStatus {
        CalibrationStatus {
            requested: self.requested,
            in_progress: self.in_progress,
            done: self.coefficients.is_some(),
            failure: self.failure,
        }
    }

    /// Current state of the sequence.
    pub fn state(&self) -> State {
        self.fsm.state()
    }

    /// Coefficients of the last successful run, or restored ones.
    pub fn coefficients(&self) -> Option<Coefficients> {
        self.coefficients
    }

    /// Replaces the coefficients, marking the calibration as done.
    pub fn set_coefficients(&mut self, coefficients: Coefficients) {
        self.coefficients = Some(coefficients);
    }

    /// Advances the sequence by one tick. `sample` is the filtered reading,
    /// before calibration is applied.
    pub fn step<D>(&mut self, sample: Sample, display: &mut D, now_ms: u64)
    where
        D: DrawTarget<Color = C>,
    {
        self.fsm.update(now_ms);

        match self.fsm.state() {
            State::Idle => self.idle(),
            State::AcquireP1 => self.acquire(0, State::AcquireP2, sample, display),
            State::AcquireP2 => self.acquire(1, State::AcquireP3, sample, display),
            State::AcquireP3 => self.acquire(2, State::ComputeFactors, sample, display),
            State::ComputeFactors => self.compute(),
        }
    }

    fn idle(&mut self) {
        if self.requested {
            self.requested = false;
            self.in_progress = true;
            self.failure = None;
            log::info!("touch calibration started");

            self.fsm.goto(State::AcquireP1);
        }
    }

    fn acquire<D>(&mut self, index: usize, next: State, sample: Sample, display: &mut D)
    where
        D: DrawTarget<Color = C>,
    {
        if self.fsm.first_entry() {
            if index == 0 && display.clear(self.marker.background).is_err() {
                log::warn!("failed to clear display for calibration");
            }
            self.draw_marker(index, self.marker.foreground, display);
            self.touched = false;
            return;
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if self.fsm.time_in_state_ms() >= timeout_ms {
                log::warn!("calibration target {} timed out after {} ms", index + 1, timeout_ms);
                self.draw_marker(index, self.marker.background, display);
                self.in_progress = false;
                self.failure = Some(CalibrationFailure::TimedOut);
                self.fsm.goto(State::Idle);
                return;
            }
        }

        if !self.touched {
            if !sample.pressed {
                return;
            }
            self.touched = true;
        }

        if sample.pressed {
            self.touch_points[index] = CalibrationPoint::new(sample.x.into(), sample.y.into());
        } else {
            log::debug!(
                "calibration target {} touched at {:?}",
                index + 1,
                self.touch_points[index]
            );
            self.draw_marker(index, self.marker.background, display);
            self.fsm.goto(next);
        }
    }

    fn compute(&mut self) {
        match compute_coefficients(&self.display_points, &self.touch_points) {
            Some(coefficients) => {
                log::info!("touch calibration done: {:?}", coefficients.factors());
                self.coefficients = Some(coefficients);
            }
            None => {
                log::warn!("calibration touch points are collinear, keeping previous calibration");
                self.failure = Some(CalibrationFailure::Degenerate);
            }
        }

        self.in_progress = false;
        self.fsm.goto(State::Idle);
    }

    fn draw_marker<D>(&self, index: usize, color: C, display: &mut D)
    where
        D: DrawTarget<Color = C>,
    {
        let target = self.display_points[index];
        let center = Point::new(target.x as i32, target.y as i32);

        let drawn = Circle::with_center(center, 2 * self.marker.radius + 1)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(display);
        if drawn.is_err() {
            log::warn!("failed to draw calibration target {}", index + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{mock_display::MockDisplay, pixelcolor::BinaryColor};

    const TARGETS: [CalibrationPoint; 3] = [
        CalibrationPoint::new(10, 10),
        CalibrationPoint::new(50, 20),
        CalibrationPoint::new(30, 50),
    ];

    struct Run {
        calibrator: Calibrator<BinaryColor>,
        display: MockDisplay<BinaryColor>,
        now_ms: u64,
    }

    impl Run {
        fn new(timeout_ms: Option<u32>) -> Self {
            let mut display = MockDisplay::new();
            display.set_allow_overdraw(true);

            Self {
                calibrator: Calibrator::new(
                    TARGETS,
                    Marker {
                        radius: 2,
                        foreground: BinaryColor::On,
                        background: BinaryColor::Off,
                    },
                    timeout_ms,
                ),
                display,
                now_ms: 0,
            }
        }

        fn tick(&mut self, sample: Sample) {
            self.now_ms += 10;
            self.calibrator.step(sample, &mut self.display, self.now_ms);
        }

        fn idle(&mut self) {
            self.tick(Sample::default());
        }

        /// Press and release, ending on the first tick of the following state.
        fn touch(&mut self, x: u16, y: u16) {
            let pressed = Sample {
                x,
                y,
                force: 500,
                pressed: true,
            };
            self.tick(pressed);
            self.tick(pressed);
            self.tick(Sample {
                pressed: false,
                ..pressed
            });
            self.tick(Sample {
                pressed: false,
                ..pressed
            });
        }

        fn pixel(&self, target: usize) -> Option<BinaryColor> {
            let p = TARGETS[target];
            self.display.get_pixel(Point::new(p.x as i32, p.y as i32))
        }

        fn start(&mut self) {
            self.calibrator.request();
            self.idle();
            self.idle();
        }
    }

    fn raw(target: usize) -> (u16, u16) {
        let p = TARGETS[target];
        ((2 * p.x + 100) as u16, (2 * p.y + 100) as u16)
    }

    #[test]
    fn idle_until_requested() {
        let mut run = Run::new(None);
        for _ in 0..5 {
            run.idle();
        }

        assert_eq!(run.calibrator.state(), State::Idle);
        assert_eq!(run.calibrator.status(), CalibrationStatus::default());
    }

    #[test]
    fn full_sequence() {
        let mut run = Run::new(None);
        run.calibrator.request();
        assert!(run.calibrator.status().requested);

        run.idle();
        let status = run.calibrator.status();
        assert!(!status.requested);
        assert!(status.in_progress);

        run.idle();
        assert_eq!(run.calibrator.state(), State::AcquireP1);

        let states = [State::AcquireP2, State::AcquireP3, State::ComputeFactors];
        for (target, expected) in states.into_iter().enumerate() {
            let (x, y) = raw(target);
            run.touch(x, y);
            assert_eq!(run.calibrator.state(), expected);
        }

        let status = run.calibrator.status();
        assert!(status.done);
        assert!(!status.in_progress);
        assert_eq!(status.failure, None);

        run.idle();
        assert_eq!(run.calibrator.state(), State::Idle);
        let touched = TARGETS.map(|p| CalibrationPoint::new(2 * p.x + 100, 2 * p.y + 100));
        assert_eq!(
            run.calibrator.coefficients(),
            compute_coefficients(&TARGETS, &touched)
        );
    }

    #[test]
    fn markers_drawn_and_erased() {
        let mut run = Run::new(None);
        run.start();

        assert_eq!(run.pixel(0), Some(BinaryColor::On));
        assert_eq!(run.pixel(1), Some(BinaryColor::Off));

        let (x, y) = raw(0);
        run.touch(x, y);
        assert_eq!(run.pixel(0), Some(BinaryColor::Off));
        assert_eq!(run.pixel(1), Some(BinaryColor::On));
    }

    #[test]
    fn waits_for_touch() {
        let mut run = Run::new(None);
        run.start();
        for _ in 0..1000 {
            run.idle();
        }

        assert_eq!(run.calibrator.state(), State::AcquireP1);
        assert!(run.calibrator.status().in_progress);
    }

    #[test]
    fn collinear_touch_fails() {
        let mut run = Run::new(None);
        run.start();
        for _ in 0..3 {
            run.touch(2000, 2000);
        }

        let status = run.calibrator.status();
        assert!(!status.done);
        assert!(!status.in_progress);
        assert_eq!(status.failure, Some(CalibrationFailure::Degenerate));
    }

    #[test]
    fn failed_run_keeps_previous_coefficients() {
        let mut run = Run::new(None);
        let previous = Coefficients::new([2, 1, 0, 0, 0, 1, 0]).unwrap();
        run.calibrator.set_coefficients(previous);

        run.start();
        for _ in 0..3 {
            run.touch(2000, 2000);
        }

        assert!(run.calibrator.status().done);
        assert_eq!(run.calibrator.coefficients(), Some(previous));
    }

    #[test]
    fn times_out_waiting_for_touch() {
        let mut run = Run::new(Some(500));
        run.start();
        for _ in 0..49 {
            run.idle();
        }
        assert_eq!(run.calibrator.state(), State::AcquireP1);
        assert!(run.calibrator.status().in_progress);

        run.idle();
        run.idle();
        let status = run.calibrator.status();
        assert_eq!(run.calibrator.state(), State::Idle);
        assert!(!status.in_progress);
        assert_eq!(status.failure, Some(CalibrationFailure::TimedOut));
        assert_eq!(run.pixel(0), Some(BinaryColor::Off));
    }

    #[test]
    fn timeout_above_tracked_limit_still_fires() {
        let mut run = Run::new(Some(2 * TIME_IN_STATE_LIMIT_MS));
        run.start();
        run.idle();

        run.now_ms += u64::from(TIME_IN_STATE_LIMIT_MS);
        run.idle();
        let status = run.calibrator.status();
        assert_eq!(run.calibrator.state(), State::AcquireP1);
        assert_eq!(status.failure, Some(CalibrationFailure::TimedOut));
        assert!(!status.in_progress);

        run.idle();
        assert_eq!(run.calibrator.state(), State::Idle);
    }

    #[test]
    fn restart_after_timeout_clears_failure() {
        let mut run = Run::new(Some(100));
        run.start();
        for _ in 0..20 {
            run.idle();
        }
        assert_eq!(run.calibrator.status().failure, Some(CalibrationFailure::TimedOut));

        run.start();
        assert_eq!(run.calibrator.state(), State::AcquireP1);
        assert_eq!(run.calibrator.status().failure, None);
    }
}
