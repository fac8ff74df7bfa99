// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    CHANNELS,
    buffer::ChannelRuns,
    channel::Channel,
    context::{IrqCtx, MainCtx, Mutex},
    filter::truncated_mean,
    pipeline::RunConsumer,
    ring::Ring,
};
use core::cell::Cell;
use curveipo::Curve;
use q16::{Q16, q16};

/// σ multiplier of the truncated mean filter.
pub const FILTER_WINDOW: Q16 = q16!(11 / 10);

/// Number of buffer halves that can wait for the main loop.
pub const QUEUE_SIZE: usize = 4;

/// 12 bit ADC.
const ADC_FULL_SCALE: i32 = 1 << 12;

/// Knob position to setpoint, with dead zones at both ends.
const KNOB_CURVE: Curve<Q16, (Q16, Q16), 4> = Curve::new([
    // (knob, setpoint)
    (q16!(0), q16!(0)),
    (q16!(1 / 50), q16!(0)),
    (q16!(49 / 50), q16!(1)),
    (q16!(1), q16!(1)),
]);

/// One filtered value per channel at one control tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Tick {
    values: [u32; CHANNELS],
}

impl Tick {
    /// Reduce every channel run to its truncated mean.
    pub fn from_runs<const N: usize>(runs: &ChannelRuns<N>, window: Q16) -> Self {
        let mut values = [0; CHANNELS];
        for chan in Channel::ALL {
            values[chan.index()] = truncated_mean(runs.run(chan), window);
        }
        Self { values }
    }

    #[inline]
    pub fn get(&self, chan: Channel) -> u32 {
        self.values[chan.index()]
    }

    /// Knob setpoint in the range 0..=1.
    pub fn knob(&self) -> Q16 {
        let pos = Q16::from_fraction(self.get(Channel::Knob) as i32, ADC_FULL_SCALE);
        KNOB_CURVE.lin_inter(pos.min(Q16::ONE))
    }
}

impl core::ops::Index<Channel> for Tick {
    type Output = u32;

    fn index(&self, chan: Channel) -> &u32 {
        &self.values[chan.index()]
    }
}

/// Hand-off from the acquisition interrupt to the main loop.
pub struct Io<const N: usize> {
    out: Ring<ChannelRuns<N>, QUEUE_SIZE>,
}

impl<const N: usize> Io<N> {
    pub const fn new() -> Self {
        Self {
            out: Ring::new(
                [const { Mutex::new(Cell::new(ChannelRuns::new())) }; QUEUE_SIZE],
            ),
        }
    }

    /// Take the oldest pending buffer half and filter it.
    pub fn poll(&self, _m: &MainCtx<'_>) -> Option<Tick> {
        let runs = critical_section::with(|cs| self.out.get(cs))?;
        Some(Tick::from_runs(&runs, FILTER_WINDOW))
    }

    /// Busy-wait for the next tick.
    pub fn wait(&self, m: &MainCtx<'_>) -> Tick {
        loop {
            if let Some(tick) = self.poll(m) {
                break tick;
            }
        }
    }

    /// Number of buffer halves dropped, because the main loop was too slow.
    pub fn lost(&self, _m: &MainCtx<'_>) -> u16 {
        critical_section::with(|cs| self.out.lost(cs))
    }
}

impl<const N: usize> Default for Io<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RunConsumer<N> for Io<N> {
    fn consume(&self, c: &IrqCtx<'_>, runs: ChannelRuns<N>) {
        // A full queue drops the runs. They are counted in `lost`.
        self.out.insert(c.cs(), runs);
    }
}


// vim: ts=4 sw=4 expandtab
