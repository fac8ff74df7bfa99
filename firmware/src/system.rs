// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use stm32_metapac::{self as pac, iwdg::vals::Key};

/// Start the independent watchdog with a timeout of about 40 ms.
///
/// Once started, it can only be stopped by a reset.
pub fn wdt_init() {
    if cfg!(feature = "watchdog") {
        let iwdg = pac::IWDG;
        iwdg.kr().write(|w| w.set_key(Key::ENABLE));
        // LSI 40 kHz / 4 / 400
        iwdg.pr().write(|w| w.set_pr(pac::iwdg::vals::Pr::DIVIDE_BY4));
        iwdg.rlr().write(|w| w.set_rl(400));
        iwdg.kr().write(|w| w.set_key(Key::RESET));
        iwdg.kr().write(|w| w.set_key(Key::START));
    }
}

#[inline(always)]
pub fn wdt_poke() {
    if cfg!(feature = "watchdog") {
        pac::IWDG.kr().write(|w| w.set_key(Key::RESET));
    }
}

/// Cheaper Option::unwrap() alternative.
///
/// This is cheaper, because it doesn't call into the panic path.
#[inline(always)]
pub fn unwrap_option<T>(value: Option<T>) -> T {
    match value {
        Some(value) => value,
        None => reset_system(),
    }
}

/// Reset the system.
#[inline(always)]
pub fn reset_system() -> ! {
    // Keep the triac off while waiting for the reset.
    crate::hw::triac_gates_off();
    if !cfg!(feature = "watchdog") {
        cortex_m::peripheral::SCB::sys_reset();
    }
    loop {
        // Wait for the watchdog timer to trigger and reset the system.
        // No interrupt pokes the watchdog.
    }
}

#[inline(always)]
#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    reset_system();
}

// vim: ts=4 sw=4 expandtab
