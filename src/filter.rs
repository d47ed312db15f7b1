use crate::acquire::Sample;

/// Window of the last `N` readings of one channel.
#[derive(Debug)]
struct Window<const N: usize> {
    samples: [u16; N],
    sum: u32,
}

impl<const N: usize> Window<N> {
    fn new() -> Self {
        Self {
            samples: [0; N],
            sum: 0,
        }
    }

    fn fill(&mut self, value: u16) {
        self.samples = [value; N];
    }

    /// Stores `value` at `index`, then resums the whole window.
    fn put(&mut self, index: usize, value: u16) -> u16 {
        self.samples[index] = value;
        self.sum = self.samples.iter().map(|&sample| u32::from(sample)).sum();

        // The average of u16 values always fits.
        (self.sum / N as u32) as u16
    }
}

/// Moving average over the last `N` samples, per channel.
///
/// A new touch (the sample is pressed, the previous one was not) flushes the
/// window with the new sample, so stale positions never bleed into it.
///
/// # Examples
///
/// ```
/// use resistive_touch::{MovingAverage, Sample};
///
/// let mut filter = MovingAverage::<4>::new();
/// let touch = Sample { x: 100, y: 200, force: 30, pressed: true };
///
/// assert_eq!(filter.push(touch), touch);
/// assert_eq!(filter.push(Sample { x: 104, ..touch }).x, 101);
/// ```
#[derive(Debug)]
pub struct MovingAverage<const N: usize = 8> {
    x: Window<N>,
    y: Window<N>,
    force: Window<N>,
    index: usize,
    was_pressed: bool,
}

impl<const N: usize> MovingAverage<N> {
    /// Panics if `N` is zero.
    pub fn new() -> Self {
        assert!(N > 0, "The filter window must hold at least one sample");

        Self {
            x: Window::new(),
            y: Window::new(),
            force: Window::new(),
            index: 0,
            was_pressed: false,
        }
    }

    pub fn push(&mut self, sample: Sample) -> Sample {
        if sample.pressed && !self.was_pressed {
            self.x.fill(sample.x);
            self.y.fill(sample.y);
            self.force.fill(sample.force);
        }
        self.was_pressed = sample.pressed;

        let index = self.index;
        self.index = (index + 1) % N;

        Sample {
            x: self.x.put(index, sample.x),
            y: self.y.put(index, sample.y),
            force: self.force.put(index, sample.force),
            pressed: sample.pressed,
        }
    }
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}
