use super::{FOOT_SWITCH_KNOB, KNOB_CHANNEL_MAP, KNOB_COUNT};

/// Latest potentiometer readings in logical knob order.
///
/// The converter runs free in circular mode; a completed batch is copied in
/// on the next scan, so a value is at most one batch period old.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KnobBank {
    values: [u16; KNOB_COUNT],
}

impl KnobBank {
    pub const fn new() -> Self {
        Self {
            values: [0; KNOB_COUNT],
        }
    }

    /// Copy in a completed sample batch (physical channel order), or keep
    /// the prior values when no batch completed since the last scan.
    pub fn update(&mut self, batch: Option<[u16; KNOB_COUNT]>) {
        let Some(samples) = batch else {
            return;
        };
        for (value, &channel) in self.values.iter_mut().zip(KNOB_CHANNEL_MAP.iter()) {
            *value = samples[channel];
        }
    }

    /// Values as sent in a `/knobs` reply.
    pub fn snapshot(&self) -> [i32; KNOB_COUNT] {
        self.values.map(i32::from)
    }

    /// Raw reading of the foot-switch channel.
    pub fn foot_switch_raw(&self) -> u16 {
        self.values[FOOT_SWITCH_KNOB]
    }
}
