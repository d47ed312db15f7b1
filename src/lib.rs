#![cfg_attr(not(test), no_std)]

//! Touch input for XPT2046-style resistive touch controllers: sampling over
//! SPI, moving-average smoothing and three-point calibration to display
//! coordinates.
//!
//! [`Touch`] is driven by calling [`tick`](Touch::tick) periodically, nominally
//! every 10 ms. Each tick reads the controller, filters the reading, applies
//! the calibration when one is available, and advances the calibration
//! sequence if one was started with [`start_calibration`](Touch::start_calibration).

mod acquire;
pub mod calibration;
mod calibrator;
pub mod codec;
mod config;
mod error;
mod filter;
mod fsm;
pub mod transport;

pub use crate::{
    acquire::{pressure, Acquirer, Sample},
    calibration::{Coefficients, DisplayLimits},
    calibrator::{CalibrationStatus, Calibrator},
    config::{default_targets, Config, Marker},
    error::{BusError, CalibrationFailure, Error},
    filter::MovingAverage,
    fsm::{CalibrationFsm, State, TIME_IN_STATE_LIMIT_MS},
    transport::{Clock, Transport},
};
use embedded_graphics::{draw_target::DrawTarget, pixelcolor::PixelColor};

/// The last reading published by [`Touch::tick`]: `page` (x) and `col` (y) in
/// display pixels once calibrated, raw converter codes before that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchSnapshot {
    pub page: u16,
    pub col: u16,
    pub force: u16,
    pub pressed: bool,
}

/// Touch driver for one panel.
///
/// `N` is the length of the moving-average window.
#[derive(Debug)]
pub struct Touch<T, K, C, const N: usize = 8> {
    transport: T,
    clock: K,
    limits: DisplayLimits,
    filter_enabled: bool,
    acquirer: Acquirer,
    filter: MovingAverage<N>,
    calibrator: Calibrator<C>,
    snapshot: TouchSnapshot,
    initialized: bool,
}

impl<T, K, C, const N: usize> Touch<T, K, C, N>
where
    T: Transport,
    K: Clock,
    C: PixelColor,
{
    /// Returns a driver using the provided `config`. Call
    /// [`init`](Touch::init) before anything else.
    ///
    /// Panics if `N` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use embedded_graphics::{mock_display::MockDisplay, pixelcolor::BinaryColor};
    /// use resistive_touch::{
    ///     transport::{Level, SpiTransport},
    ///     Config, DisplayLimits, Marker, Touch,
    /// };
    /// # use embedded_hal_mock::{
    /// #     pin::{Mock as PinMock, State, Transaction as PinTransaction},
    /// #     spi::Mock as SpiMock,
    /// # };
    /// #
    /// # let spi = SpiMock::new(&[]);
    /// # let cs = PinMock::new(&[PinTransaction::set(State::High)]);
    /// # let irq = PinMock::new(&[PinTransaction::get(State::High)]);
    /// # let mut display = MockDisplay::<BinaryColor>::new();
    ///
    /// let config = Config::new(
    ///     DisplayLimits { max_x: 479, max_y: 319 },
    ///     Marker {
    ///         radius: 6,
    ///         foreground: BinaryColor::On,
    ///         background: BinaryColor::Off,
    ///     },
    /// );
    /// let transport = SpiTransport::new(spi, cs, irq, Level::Low);
    /// let mut millis: u64 = 0;
    /// let clock = move || {
    ///     millis += 10;
    ///     millis
    /// };
    ///
    /// let mut touch: Touch<_, _, _> = Touch::new(transport, clock, config);
    /// assert!(touch.init().is_ok());
    ///
    /// // The touch line is high, so the panel is not touched.
    /// assert!(touch.tick(&mut display).is_ok());
    /// assert_eq!(touch.touch().map(|t| t.pressed), Ok(false));
    /// ```
    pub fn new(transport: T, clock: K, config: Config<C>) -> Self {
        Self {
            transport,
            clock,
            limits: config.limits,
            filter_enabled: config.filter,
            acquirer: Acquirer::new(config.resolution, config.reference),
            filter: MovingAverage::new(),
            calibrator: Calibrator::new(
                config.display_points,
                config.marker,
                config.calibration_timeout_ms,
            ),
            snapshot: TouchSnapshot::default(),
            initialized: false,
        }
    }

    /// Initializes the transport and puts the calibration sequence in idle.
    pub fn init(&mut self) -> Result<(), Error<T::Error>> {
        if self.initialized {
            return Err(Error::AlreadyInitialized);
        }

        self.transport.init().map_err(Error::Transport)?;
        self.calibrator.reset();
        self.initialized = true;

        Ok(())
    }

    /// Whether [`init`](Touch::init) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Samples the panel and publishes a new [`TouchSnapshot`], then advances
    /// the calibration sequence, which draws its targets on `display`.
    ///
    /// Transport failures are not returned: the previous reading is held and
    /// reported as released.
    pub fn tick<D>(&mut self, display: &mut D) -> Result<(), Error<T::Error>>
    where
        D: DrawTarget<Color = C>,
    {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }

        let now_ms = self.clock.now_ms();
        let raw = self.acquirer.acquire(&mut self.transport);
        let sample = if self.filter_enabled {
            self.filter.push(raw)
        } else {
            raw
        };

        let (page, col) = match self.calibrator.coefficients() {
            Some(coefficients) => calibration::apply(sample.x, sample.y, &coefficients, self.limits),
            None => (sample.x, sample.y),
        };
        self.snapshot = TouchSnapshot {
            page,
            col,
            force: sample.force,
            pressed: sample.pressed,
        };

        self.calibrator.step(sample, display, now_ms);

        Ok(())
    }

    /// The reading published by the last [`tick`](Touch::tick).
    pub fn touch(&self) -> Result<TouchSnapshot, Error<T::Error>> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }

        Ok(self.snapshot)
    }

    /// Starts a calibration run on the next tick.
    ///
    /// Coefficients from an earlier calibration keep being applied until the
    /// new run completes.
    pub fn start_calibration(&mut self) -> Result<(), Error<T::Error>> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        if self.calibrator.status().in_progress {
            return Err(Error::CalibrationInProgress);
        }

        self.calibrator.request();

        Ok(())
    }

    /// Progress and outcome of calibration.
    pub fn calibration_status(&self) -> CalibrationStatus {
        self.calibrator.status()
    }

    /// Whether coefficients are available, so that [`touch`](Touch::touch)
    /// reports display pixels.
    pub fn is_calibrated(&self) -> bool {
        self.calibrator.status().done
    }

    /// Restores coefficients saved from an earlier calibration.
    pub fn set_calibration_coefficients(&mut self, coefficients: Coefficients) {
        self.calibrator.set_coefficients(coefficients);
    }

    /// Coefficients to persist, once calibrated.
    pub fn calibration_coefficients(&self) -> Option<Coefficients> {
        self.calibrator.coefficients()
    }

    /// Destroys the driver and returns the transport and clock.
    pub fn free(self) -> (T, K) {
        (self.transport, self.clock)
    }
}
