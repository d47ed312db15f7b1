use crate::{
    codec::{command, decode_result, encode_control, Channel, PowerDown, Reference, Resolution},
    transport::Transport,
};

/// One reading of the panel, raw or smoothed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sample {
    pub x: u16,
    pub y: u16,
    pub force: u16,
    pub pressed: bool,
}

/// Reads X, Y and pressure from the controller while the touch line is
/// asserted, and holds the last good reading otherwise.
#[derive(Debug)]
pub struct Acquirer {
    resolution: Resolution,
    reference: Reference,
    last: Sample,
}

impl Acquirer {
    pub fn new(resolution: Resolution, reference: Reference) -> Self {
        Self {
            resolution,
            reference,
            last: Sample::default(),
        }
    }

    /// Returns the current sample. When the panel is not touched, or any
    /// conversion fails, this is the last good sample with `pressed` cleared.
    pub fn acquire<T: Transport>(&mut self, transport: &mut T) -> Sample {
        let signaled = transport.touch_signaled().unwrap_or_else(|e| {
            log::warn!("touch line read failed: {:?}", e);
            false
        });

        if signaled {
            match self.convert(transport) {
                Ok(sample) => {
                    self.last = sample;
                    return sample;
                }
                Err(e) => log::warn!("touch acquisition failed: {:?}", e),
            }
        }

        Sample {
            pressed: false,
            ..self.last
        }
    }

    fn convert<T: Transport>(&self, transport: &mut T) -> Result<Sample, T::Error> {
        let x = self.read(transport, Channel::X, PowerDown::FullyOn)?;
        let y = self.read(transport, Channel::Y, PowerDown::FullyOn)?;
        let z1 = self.read(transport, Channel::Z1, PowerDown::FullyOn)?;
        let z2 = self.read(transport, Channel::Z2, PowerDown::ReferenceOn)?;

        Ok(Sample {
            x,
            y,
            force: pressure(x, z1, z2, self.resolution),
            pressed: true,
        })
    }

    fn read<T: Transport>(
        &self,
        transport: &mut T,
        channel: Channel,
        power_down: PowerDown,
    ) -> Result<u16, T::Error> {
        let control = encode_control(channel, power_down, true, self.resolution, self.reference);
        let reply = transport.exchange(command(control))?;

        Ok(decode_result(reply, self.resolution))
    }
}

/// Touch pressure estimate `x * (z2 / z1 - 1)`, scaled to the converter's
/// code range. Saturates to `0..=u16::MAX`; `z1 == 0` reads as no pressure.
pub fn pressure(x: u16, z1: u16, z2: u16, resolution: Resolution) -> u16 {
    if z1 == 0 {
        return 0;
    }

    let max_code = f32::from(resolution.max_code());
    let full_scale = max_code + 1.0;

    (f32::from(x) / full_scale * (f32::from(z2) / f32::from(z1) - 1.0) * max_code) as u16
}
