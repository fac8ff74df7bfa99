// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use acquire::{
    channel::Channel,
    context::{MainCell, MainCtx, Mutex},
    io::Tick,
};
use core::cell::Cell;

#[derive(Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Debug {
    Current,
    Voltage,
    Knob,
    VRef,
    Setpoint,
    Lost,
}
const NRVALUES: usize = 6;

/// Emit the registry every this many ticks.
const DUMP_INTERVAL: u16 = 1024;

static VALUES: Mutex<[Cell<u32>; NRVALUES]> = Mutex::new([
    Cell::new(0),
    Cell::new(0),
    Cell::new(0),
    Cell::new(0),
    Cell::new(0),
    Cell::new(0),
]);
static COUNT: MainCell<u16> = MainCell::new(0);

impl Debug {
    pub fn log_u32(&self, m: &MainCtx<'_>, value: u32) {
        let id = *self as usize;
        let values = VALUES.borrow(m.cs());
        if id < values.len() {
            values[id].set(value);
        }
    }

    #[cfg(feature = "debug")]
    fn get(&self, m: &MainCtx<'_>) -> u32 {
        VALUES.borrow(m.cs())[*self as usize].get()
    }
}

/// Record one tick and the overrun counter.
pub fn debug_tick(m: &MainCtx<'_>, tick: &Tick, lost: u16) {
    Debug::Current.log_u32(m, tick[Channel::Current]);
    Debug::Voltage.log_u32(m, tick[Channel::Voltage]);
    Debug::Knob.log_u32(m, tick[Channel::Knob]);
    Debug::VRef.log_u32(m, tick[Channel::VRef]);
    Debug::Setpoint.log_u32(m, tick.knob().to_raw() as u32);
    Debug::Lost.log_u32(m, lost.into());

    let count = COUNT.get(m).wrapping_add(1);
    if count >= DUMP_INTERVAL {
        COUNT.set(m, 0);
        debug_dump(m);
    } else {
        COUNT.set(m, count);
    }
}

#[cfg(feature = "debug")]
fn debug_dump(m: &MainCtx<'_>) {
    defmt::info!(
        "cur={} volt={} knob={} vref={} setpoint={=u32:#x} lost={}",
        Debug::Current.get(m),
        Debug::Voltage.get(m),
        Debug::Knob.get(m),
        Debug::VRef.get(m),
        Debug::Setpoint.get(m),
        Debug::Lost.get(m),
    );
}

#[cfg(not(feature = "debug"))]
fn debug_dump(_m: &MainCtx<'_>) {}

// vim: ts=4 sw=4 expandtab
