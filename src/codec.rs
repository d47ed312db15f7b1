//! Control byte and conversion result layout of the touch controller.
//!
//! Every conversion is a 3-byte exchange: the control byte goes out first,
//! the result comes back big-endian in the last two bytes.

/// Which internal signal a conversion measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    Temp0 = 0,
    Y = 1,
    Battery = 2,
    Z1 = 3,
    /// Shares its address with the YN input.
    Z2 = 4,
    X = 5,
    Aux = 6,
    Temp1 = 7,
}

/// Power-down bits (PD1, PD0).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerDown {
    /// Powered down between conversions, touch line enabled.
    PowerDown = 0,
    ReferenceOff = 1,
    ReferenceOn = 2,
    /// Always powered, touch line disabled.
    FullyOn = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Bits12,
    Bits8,
}

impl Resolution {
    /// Largest code a conversion can return.
    pub const fn max_code(self) -> u16 {
        match self {
            Resolution::Bits12 => 0x0FFF,
            Resolution::Bits8 => 0x00FF,
        }
    }

    const fn mode_bit(self) -> u8 {
        match self {
            Resolution::Bits12 => 0,
            Resolution::Bits8 => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reference {
    Differential,
    SingleEnded,
}

impl Reference {
    const fn ser_dfr_bit(self) -> u8 {
        match self {
            Reference::Differential => 0,
            Reference::SingleEnded => 1,
        }
    }
}

/// Packs a control byte, MSB first: start, channel (3 bits), mode,
/// SER/DFR, power-down (2 bits).
///
/// # Examples
///
/// ```
/// use resistive_touch::codec::{encode_control, Channel, PowerDown, Reference, Resolution};
///
/// let control = encode_control(
///     Channel::X,
///     PowerDown::FullyOn,
///     true,
///     Resolution::Bits12,
///     Reference::Differential,
/// );
/// assert_eq!(control, 0b1101_0011);
/// ```
pub const fn encode_control(
    channel: Channel,
    power_down: PowerDown,
    start: bool,
    resolution: Resolution,
    reference: Reference,
) -> u8 {
    (start as u8) << 7
        | (channel as u8) << 4
        | resolution.mode_bit() << 3
        | reference.ser_dfr_bit() << 2
        | power_down as u8
}

/// Extracts the conversion result from a 3-byte exchange.
///
/// Bytes 1..=2 form a big-endian word whose low 3 bits are reserved.
pub fn decode_result(frame: [u8; 3], resolution: Resolution) -> u16 {
    let word = u16::from_be_bytes([frame[1], frame[2]]);
    (word >> 3) & resolution.max_code()
}

/// Outgoing frame for a conversion: the control byte followed by clock-out padding.
pub const fn command(control: u8) -> [u8; 3] {
    [control, 0, 0]
}
