// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![no_std]
#![no_main]

mod debug;
mod hw;
mod system;

use crate::{
    debug::debug_tick,
    hw::{adc_init, clock_init, dma_init, irq_enable, ports_init},
    system::{unwrap_option, wdt_init, wdt_poke},
};
use acquire::{
    SAMPLES_PER_TICK, buffer::AcqBuffer, context::MainCtx, io::Io, pipeline::Pipeline,
};

#[cfg(feature = "debug")]
use defmt_rtt as _;

type AcqPipeline = Pipeline<'static, SAMPLES_PER_TICK, Io<SAMPLES_PER_TICK>>;

static ADC_BUFFER: AcqBuffer<SAMPLES_PER_TICK> = AcqBuffer::new();
static IO: Io<SAMPLES_PER_TICK> = Io::new();
static PIPELINE: AcqPipeline = Pipeline::new(&ADC_BUFFER, &IO);

#[cortex_m_rt::entry]
fn main() -> ! {
    ports_init();
    clock_init();
    wdt_init();

    let mut cp = unwrap_option(cortex_m::Peripherals::take());

    // SAFETY:
    // This is the context handle for the main() function.
    // Holding a reference to this object proves that the holder
    // is running in main() context.
    let m = unsafe { MainCtx::new() };

    dma_init(&ADC_BUFFER);
    adc_init();

    // SAFETY: All statics used by the ISR are const initialized.
    unsafe { irq_enable(&mut cp.NVIC) };

    loop {
        let tick = IO.wait(&m);
        debug_tick(&m, &tick, IO.lost(&m));
        wdt_poke();
    }
}

// vim: ts=4 sw=4 expandtab
