/// Foot-switch thresholds in raw converter counts.
///
/// The values were tuned on hardware; they are kept configurable rather
/// than derived. A reading below `press_below` counts as pressed, above
/// `release_above` as released, and anything in between keeps the previous
/// reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FootSwitchConfig {
    /// Default: 100.
    pub press_below: u16,
    /// Default: 900.
    pub release_above: u16,
}

impl Default for FootSwitchConfig {
    fn default() -> Self {
        Self {
            press_below: 100,
            release_above: 900,
        }
    }
}

/// Hysteretic, 2-slot debounced foot switch.
#[derive(Debug, Clone)]
pub struct FootSwitch {
    config: FootSwitchConfig,
    /// Candidate states of the last two polls, written alternately.
    slots: [bool; 2],
    slot: usize,
    /// Candidate carried across in-between readings.
    candidate: bool,
    /// Last reported state.
    pressed: bool,
}

impl FootSwitch {
    /// Create a foot switch in the pressed state. A pedal resting released
    /// reports `false` once its first two readings agree, so the host
    /// learns the pedal position right after boot.
    pub fn new(config: FootSwitchConfig) -> Self {
        Self {
            config,
            slots: [true; 2],
            slot: 0,
            candidate: true,
            pressed: true,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Poll with the current raw reading. Returns the new state when a
    /// transition is accepted.
    pub fn update(&mut self, raw: u16) -> Option<bool> {
        if raw < self.config.press_below {
            self.candidate = true;
        } else if raw > self.config.release_above {
            self.candidate = false;
        }

        self.slots[self.slot] = self.candidate;
        self.slot ^= 1;

        if self.slots[0] == self.slots[1] && self.slots[0] != self.pressed {
            self.pressed = self.slots[0];
            return Some(self.pressed);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: u16 = 20;
    const HIGH: u16 = 1000;
    const MID: u16 = 500;

    fn switch() -> FootSwitch {
        FootSwitch::new(FootSwitchConfig::default())
    }

    /// A switch that has already reported its resting release.
    fn released() -> FootSwitch {
        let mut fs = switch();
        fs.update(HIGH);
        assert_eq!(fs.update(HIGH), Some(false));
        fs
    }

    #[test]
    fn starts_pressed() {
        let mut fs = switch();
        assert!(fs.is_pressed());
        for _ in 0..5 {
            assert_eq!(fs.update(LOW), None);
        }
    }

    #[test]
    fn resting_pedal_reports_release_once() {
        let mut fs = switch();
        assert_eq!(fs.update(HIGH), None);
        assert_eq!(fs.update(HIGH), Some(false));
        for _ in 0..5 {
            assert_eq!(fs.update(HIGH), None);
        }
    }

    #[test]
    fn sustained_low_presses_once() {
        let mut fs = released();
        assert_eq!(fs.update(LOW), None);
        assert_eq!(fs.update(LOW), Some(true));
        for _ in 0..10 {
            assert_eq!(fs.update(LOW), None);
        }
        assert!(fs.is_pressed());
    }

    #[test]
    fn oscillation_faster_than_buffer_emits_nothing() {
        let mut fs = released();
        for i in 0..50 {
            let raw = if i % 2 == 0 { LOW } else { HIGH };
            assert_eq!(fs.update(raw), None, "poll {}", i);
        }
        assert!(!fs.is_pressed());
    }

    #[test]
    fn release_after_press() {
        let mut fs = released();
        fs.update(LOW);
        fs.update(LOW);
        assert_eq!(fs.update(HIGH), None);
        assert_eq!(fs.update(HIGH), Some(false));
    }

    #[test]
    fn in_between_values_hold_candidate() {
        let mut fs = released();
        fs.update(LOW);
        // Mid-range reading keeps "pressed" as the candidate, so the
        // buffer agrees on the second poll.
        assert_eq!(fs.update(MID), Some(true));
        for _ in 0..5 {
            assert_eq!(fs.update(MID), None);
        }
        assert!(fs.is_pressed());
    }

    #[test]
    fn thresholds_are_exclusive() {
        let cfg = FootSwitchConfig::default();
        let mut fs = released();
        fs.update(cfg.press_below);
        assert_eq!(fs.update(cfg.press_below), None);

        let mut fs = switch();
        fs.update(cfg.release_above);
        assert_eq!(fs.update(cfg.release_above), None);
    }

    #[test]
    fn custom_thresholds() {
        let mut fs = FootSwitch::new(FootSwitchConfig {
            press_below: 600,
            release_above: 700,
        });
        fs.update(750);
        assert_eq!(fs.update(750), Some(false));
        fs.update(550);
        assert_eq!(fs.update(550), Some(true));
    }
}
