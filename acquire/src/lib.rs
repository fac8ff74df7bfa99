// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Analog acquisition for the triac controller.
//!
//! DMA fills [buffer::AcqBuffer] continuously. On every half-transfer and
//! full-transfer interrupt the [pipeline::Pipeline] deinterleaves the
//! completed half into per-channel runs and hands them to [io::Io].
//! The main loop picks them up and reduces every run to one
//! [filter::truncated_mean] value, which gives one [io::Tick].

#![no_std]

pub mod buffer;
pub mod channel;
pub mod context;
pub mod filter;
pub mod io;
pub mod pipeline;
pub mod ring;

/// Number of samples per channel in one buffer half (one control tick).
pub const SAMPLES_PER_TICK: usize = 8;

/// Number of scanned analog channels.
pub const CHANNELS: usize = 4;

const _: () = assert!(SAMPLES_PER_TICK >= 2 && SAMPLES_PER_TICK <= 16);

// vim: ts=4 sw=4 expandtab
