use crate::CHANNELS;

/// The scanned analog inputs, in the order of the ADC scan sequence.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Channel {
    /// Load current (shunt).
    Current,
    /// Load voltage.
    Voltage,
    /// Operator setpoint knob.
    Knob,
    /// Internal reference voltage.
    VRef,
}

impl Channel {
    pub const ALL: [Channel; CHANNELS] = [
        Channel::Current,
        Channel::Voltage,
        Channel::Knob,
        Channel::VRef,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }
}


// vim: ts=4 sw=4 expandtab
