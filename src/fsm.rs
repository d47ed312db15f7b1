/// Upper bound on the time spent in one state, in milliseconds.
pub const TIME_IN_STATE_LIMIT_MS: u32 = 1_000_000;

/// Calibration sequence states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    AcquireP1,
    AcquireP2,
    AcquireP3,
    ComputeFactors,
}

/// State bookkeeping: the current and requested state, time spent in the
/// current state and whether this is its first tick.
///
/// A transition requested with [`goto`](CalibrationFsm::goto) takes effect on
/// the next [`update`](CalibrationFsm::update).
#[derive(Debug)]
pub struct CalibrationFsm {
    current: State,
    next: State,
    time_in_state_ms: u32,
    first_entry: bool,
    last_tick_ms: Option<u64>,
}

impl CalibrationFsm {
    pub const fn new() -> Self {
        Self {
            current: State::Idle,
            next: State::Idle,
            time_in_state_ms: 0,
            first_entry: false,
            last_tick_ms: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Latches a pending transition, or accumulates time in the current state.
    pub fn update(&mut self, now_ms: u64) {
        let elapsed = now_ms.saturating_sub(self.last_tick_ms.unwrap_or(now_ms));
        self.last_tick_ms = Some(now_ms);

        if self.current != self.next {
            self.current = self.next;
            self.time_in_state_ms = 0;
            self.first_entry = true;
        } else {
            let total = u64::from(self.time_in_state_ms).saturating_add(elapsed);
            self.time_in_state_ms = total.min(u64::from(TIME_IN_STATE_LIMIT_MS)) as u32;
            self.first_entry = false;
        }
    }

    pub fn goto(&mut self, state: State) {
        self.next = state;
    }

    pub fn state(&self) -> State {
        self.current
    }

    pub fn time_in_state_ms(&self) -> u32 {
        self.time_in_state_ms
    }

    pub fn first_entry(&self) -> bool {
        self.first_entry
    }
}

impl Default for CalibrationFsm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let mut fsm = CalibrationFsm::new();
        fsm.update(500);

        assert_eq!(fsm.state(), State::Idle);
        assert!(!fsm.first_entry());
        assert_eq!(fsm.time_in_state_ms(), 0);
    }

    #[test]
    fn transition_applies_on_next_update() {
        let mut fsm = CalibrationFsm::new();
        fsm.update(0);
        fsm.update(10);
        fsm.goto(State::AcquireP1);
        assert_eq!(fsm.state(), State::Idle);

        fsm.update(20);
        assert_eq!(fsm.state(), State::AcquireP1);
        assert!(fsm.first_entry());
        assert_eq!(fsm.time_in_state_ms(), 0);

        fsm.update(30);
        assert!(!fsm.first_entry());
        assert_eq!(fsm.time_in_state_ms(), 10);

        fsm.update(45);
        assert_eq!(fsm.time_in_state_ms(), 25);
    }

    #[test]
    fn time_in_state_saturates() {
        let mut fsm = CalibrationFsm::new();
        fsm.update(0);
        fsm.update(999_990);
        fsm.update(u64::MAX);

        assert_eq!(fsm.time_in_state_ms(), TIME_IN_STATE_LIMIT_MS);
    }

    #[test]
    fn clock_going_backwards_adds_nothing() {
        let mut fsm = CalibrationFsm::new();
        fsm.update(100);
        fsm.update(50);

        assert_eq!(fsm.time_in_state_ms(), 0);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut fsm = CalibrationFsm::new();
        fsm.goto(State::ComputeFactors);
        fsm.update(0);
        fsm.reset();

        assert_eq!(fsm.state(), State::Idle);
        fsm.update(10);
        assert_eq!(fsm.state(), State::Idle);
    }
}
