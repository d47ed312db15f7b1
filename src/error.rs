use core::fmt;

/// Errors returned by [`Touch`](crate::Touch).
///
/// `E` is the error type of the [`Transport`](crate::Transport).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The transport failed to initialize.
    Transport(E),
    /// [`Touch::init`](crate::Touch::init) has not been called.
    NotInitialized,
    /// [`Touch::init`](crate::Touch::init) was called twice.
    AlreadyInitialized,
    /// A calibration is already running.
    CalibrationInProgress,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "transport error: {:?}", e),
            Error::NotInitialized => f.write_str("touch driver not initialized"),
            Error::AlreadyInitialized => f.write_str("touch driver already initialized"),
            Error::CalibrationInProgress => f.write_str("calibration in progress"),
        }
    }
}

/// Errors of [`SpiTransport`](crate::transport::SpiTransport).
///
/// `S`, `C` and `I` are the error types of the SPI bus, the chip select pin
/// and the touch line input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusError<S, C, I> {
    Spi(S),
    ChipSelect(C),
    TouchLine(I),
}

/// Why the last calibration run did not produce coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationFailure {
    /// The three touch points were collinear.
    Degenerate,
    /// No touch arrived within the configured timeout.
    TimedOut,
}

impl fmt::Display for CalibrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationFailure::Degenerate => f.write_str("calibration points are collinear"),
            CalibrationFailure::TimedOut => f.write_str("calibration timed out"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Error::Transport(BusError::<u8, (), ()>::Spi(3)).to_string(),
            "transport error: Spi(3)"
        );
        assert_eq!(Error::<()>::CalibrationInProgress.to_string(), "calibration in progress");
        assert_eq!(CalibrationFailure::TimedOut.to_string(), "calibration timed out");
    }
}
