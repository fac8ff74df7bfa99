// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! STM32F072CB bring-up.
//!
//! Pin and channel assignment:
//!
//! - PA1 (ADC_IN1): motor current
//! - PA2 (ADC_IN2): motor voltage
//! - PA3 (ADC_IN3): speed knob
//! - ADC_IN17: internal voltage reference
//! - PA5, PA6, PA7: triac gate drivers, low-active
//!
//! The ADC converts the selected channels in ascending channel order,
//! which is the [acquire::channel::Channel] order.

use acquire::{buffer::AcqBuffer, context::IrqCtx, pipeline::CompletionHandler};
use core::sync::atomic::{Ordering, compiler_fence};
use stm32_metapac::{
    self as pac,
    adc::vals::{Dmacfg, Res, SampleTime},
    bdma::vals::{Dir, Pl, Size},
    flash::vals::Latency,
    gpio::vals::Moder,
    interrupt,
    rcc::vals::{Hpre, Pllmul, Pllsrc, Ppre, Sw},
};

/// ADC input channels in scan order.
const ADC_CHANNELS: [usize; acquire::CHANNELS] = [1, 2, 3, 17];

/// Analog input pins on GPIOA.
const ANALOG_PINS: [usize; 3] = [1, 2, 3];

/// Triac gate pins on GPIOA.
const TRIAC_PINS: [usize; 3] = [5, 6, 7];

/// DMA1 channel 1 is hard wired to the ADC.
const DMA_CH: usize = 0;

macro_rules! define_isr {
    ($name:ident, $handler:path) => {
        #[interrupt]
        fn $name() {
            // SAFETY: We are inside of an interrupt handler.
            // Therefore, it is safe to construct an `IrqCtx`.
            let c = unsafe { IrqCtx::new() };
            $handler(&c);
        }
    };
}

define_isr!(DMA1_CHANNEL1, irq_handler_dma1_ch1);

fn irq_handler_dma1_ch1(c: &IrqCtx<'_>) {
    let dma = pac::DMA1;
    let isr = dma.isr().read();
    // If both flags are set, we are late and the first half is the older one.
    if isr.htif(DMA_CH) {
        dma.ifcr().write(|w| w.set_htif(DMA_CH, true));
        crate::PIPELINE.on_half_complete(c);
    }
    if isr.tcif(DMA_CH) {
        dma.ifcr().write(|w| w.set_tcif(DMA_CH, true));
        crate::PIPELINE.on_full_complete(c);
    }
}

/// 48 MHz from HSI/2 through the PLL.
pub fn clock_init() {
    let rcc = pac::RCC;

    pac::FLASH.acr().write(|w| {
        w.set_latency(Latency::WS1);
        w.set_prftbe(true);
    });

    rcc.cfgr().write(|w| {
        w.set_pllmul(Pllmul::MUL12);
        w.set_pllsrc(Pllsrc::HSI_DIV2);
        w.set_ppre(Ppre::DIV1);
        w.set_hpre(Hpre::DIV1);
    });
    rcc.cr().modify(|w| w.set_pllon(true));
    while !rcc.cr().read().pllrdy() {}

    rcc.cfgr().modify(|w| w.set_sw(Sw::PLL1_P));
    while rcc.cfgr().read().sws() != Sw::PLL1_P {}

    // Dedicated 14 MHz ADC clock.
    rcc.cr2().modify(|w| w.set_hsi14on(true));
    while !rcc.cr2().read().hsi14rdy() {}
}

/// Force all triac gates off.
#[inline(always)]
pub fn triac_gates_off() {
    pac::GPIOA.bsrr().write(|w| {
        for pin in TRIAC_PINS {
            w.set_bs(pin, true);
        }
    });
}

pub fn ports_init() {
    pac::RCC.ahbenr().modify(|w| w.set_gpioaen(true));
    compiler_fence(Ordering::SeqCst);

    // Set the output latch before switching to output mode.
    triac_gates_off();

    pac::GPIOA.moder().modify(|w| {
        for pin in ANALOG_PINS {
            w.set_moder(pin, Moder::ANALOG);
        }
        for pin in TRIAC_PINS {
            w.set_moder(pin, Moder::OUTPUT);
        }
    });
}

/// Circular peripheral-to-memory transfer of all ADC results into `buf`.
pub fn dma_init<const N: usize>(buf: &'static AcqBuffer<N>) {
    pac::RCC.ahbenr().modify(|w| w.set_dmaen(true));
    compiler_fence(Ordering::SeqCst);

    let ch = pac::DMA1.ch(DMA_CH);
    ch.cr().write(|w| {
        w.set_dir(Dir::FROM_PERIPHERAL);
        w.set_minc(true);
        w.set_pinc(false);
        w.set_msize(Size::BITS16);
        w.set_psize(Size::BITS16);
        w.set_circ(true);
        w.set_pl(Pl::HIGH);
    });
    ch.ndtr().write(|w| w.set_ndt(AcqBuffer::<N>::CELLS as u16));
    ch.par().write_value(pac::ADC1.dr().as_ptr() as u32);
    ch.mar().write_value(buf.dma_addr() as u32);
    ch.cr().modify(|w| {
        w.set_htie(true);
        w.set_tcie(true);
        w.set_en(true);
    });
}

/// Free running scan conversion of all [ADC_CHANNELS].
///
/// [dma_init] must have been called before.
pub fn adc_init() {
    pac::RCC.apb2enr().modify(|w| w.set_adcen(true));
    compiler_fence(Ordering::SeqCst);

    let adc = pac::ADC1;

    // Calibration requires ADEN=0 and DMAEN=0.
    adc.cr().write(|w| w.set_adcal(true));
    while adc.cr().read().adcal() {}

    adc.cfgr1().write(|w| {
        w.set_res(Res::BITS12);
        w.set_cont(true);
        w.set_ovrmod(true);
        w.set_dmaen(true);
        w.set_dmacfg(Dmacfg::CIRCULAR);
    });
    adc.smpr().write(|w| w.set_smp(SampleTime::CYCLES239_5));
    adc.chselr().write(|w| {
        for ch in ADC_CHANNELS {
            w.set_chsel_x(ch, true);
        }
    });
    adc.ccr().modify(|w| w.set_vrefen(true));

    // ADEN may be cleared a few cycles after calibration. Set it until ready.
    while !adc.isr().read().adrdy() {
        adc.cr().modify(|w| w.set_aden(true));
    }
    adc.cr().modify(|w| w.set_adstart(true));
}

/// Enable the DMA completion interrupt.
///
/// # SAFETY
///
/// The ISR uses the static pipeline data.
/// The statics must be fully set up before calling this.
pub unsafe fn irq_enable(nvic: &mut cortex_m::peripheral::NVIC) {
    // SAFETY: The ISR only shares data with main() through critical sections.
    unsafe {
        nvic.set_priority(pac::Interrupt::DMA1_CHANNEL1, 0);
        cortex_m::peripheral::NVIC::unmask(pac::Interrupt::DMA1_CHANNEL1);
    }
}

// vim: ts=4 sw=4 expandtab
