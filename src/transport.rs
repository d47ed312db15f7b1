use crate::error::BusError;
use core::fmt;
use embedded_hal::{
    blocking::spi::Transfer,
    digital::v2::{InputPin, OutputPin},
};

/// Serial link to the touch controller.
pub trait Transport {
    type Error: fmt::Debug;

    /// Called once by [`Touch::init`](crate::Touch::init).
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Full-duplex transfer of `frame` with the chip selected for the whole
    /// exchange. Returns the bytes clocked in.
    fn exchange<const LEN: usize>(&mut self, frame: [u8; LEN]) -> Result<[u8; LEN], Self::Error>;

    /// Whether the touch line currently signals a touch.
    fn touch_signaled(&mut self) -> Result<bool, Self::Error>;
}

/// Monotonic milliseconds since boot.
pub trait Clock {
    fn now_ms(&mut self) -> u64;
}

impl<F> Clock for F
where
    F: FnMut() -> u64,
{
    fn now_ms(&mut self) -> u64 {
        self()
    }
}

/// Level of the touch line while the panel is touched.
///
/// The controller pulls its line low on touch; boards with an inverter in
/// front of the input see it high.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

/// [`Transport`] over an embedded-hal SPI bus, a chip select pin and the
/// touch line input.
#[derive(Debug)]
pub struct SpiTransport<SPI, CS, IRQ> {
    spi: SPI,
    cs: CS,
    irq: IRQ,
    active: Level,
}

impl<SPI, CS, IRQ> SpiTransport<SPI, CS, IRQ> {
    pub fn new(spi: SPI, cs: CS, irq: IRQ, active: Level) -> Self {
        Self {
            spi,
            cs,
            irq,
            active,
        }
    }

    /// Destroys the transport and returns the peripherals.
    pub fn free(self) -> (SPI, CS, IRQ) {
        (self.spi, self.cs, self.irq)
    }
}

impl<SPI, CS, IRQ, SpiError, CsError, IrqError> Transport for SpiTransport<SPI, CS, IRQ>
where
    SPI: Transfer<u8, Error = SpiError>,
    CS: OutputPin<Error = CsError>,
    IRQ: InputPin<Error = IrqError>,
    SpiError: fmt::Debug,
    CsError: fmt::Debug,
    IrqError: fmt::Debug,
{
    type Error = BusError<SpiError, CsError, IrqError>;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.cs.set_high().map_err(BusError::ChipSelect)
    }

    fn exchange<const LEN: usize>(&mut self, frame: [u8; LEN]) -> Result<[u8; LEN], Self::Error> {
        let mut buffer = frame;

        self.cs.set_low().map_err(BusError::ChipSelect)?;
        let transferred = self.spi.transfer(&mut buffer).map(|_| ());
        self.cs.set_high().map_err(BusError::ChipSelect)?;
        transferred.map_err(BusError::Spi)?;

        Ok(buffer)
    }

    fn touch_signaled(&mut self) -> Result<bool, Self::Error> {
        let level = match self.active {
            Level::High => self.irq.is_high(),
            Level::Low => self.irq.is_low(),
        };

        level.map_err(BusError::TouchLine)
    }
}
