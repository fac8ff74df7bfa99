// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DMA double buffer.
//!
//! The ADC scans all [CHANNELS] in [Channel] order and DMA stores the
//! results cyclically into the buffer. One half holds `N` scans.
//! DMA signals completion at the end of each half. While software reads
//! the completed half, DMA fills the other one. Therefore, the completed
//! half has to be read out within the time DMA needs to fill one half.
//!
//! All cells are atomics, because DMA writes them behind the back of the
//! compiler. The two halves are disjoint, so no lock is needed.

use crate::{CHANNELS, channel::Channel};
use core::sync::atomic::{AtomicU16, Ordering};

/// One scan of all channels.
type Scan = [AtomicU16; CHANNELS];

/// One half of the DMA buffer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Half {
    /// Completed at the DMA half-transfer event.
    First,
    /// Completed at the DMA transfer-complete event.
    Second,
}

impl Half {
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The raw samples of one buffer half, sorted by channel.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ChannelRuns<const N: usize> {
    runs: [[u16; N]; CHANNELS],
}

impl<const N: usize> ChannelRuns<N> {
    pub const fn new() -> Self {
        Self {
            runs: [[0; N]; CHANNELS],
        }
    }

    #[inline(always)]
    pub fn run(&self, chan: Channel) -> &[u16; N] {
        &self.runs[chan.index()]
    }

    #[cfg(test)]
    pub(crate) fn run_mut(&mut self, chan: Channel) -> &mut [u16; N] {
        &mut self.runs[chan.index()]
    }
}

impl<const N: usize> Default for ChannelRuns<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The DMA target buffer: two halves of `N` interleaved scans.
///
/// The memory layout is `2 * N * CHANNELS` contiguous `u16` cells.
#[repr(C)]
pub struct AcqBuffer<const N: usize> {
    halves: [[Scan; N]; 2],
}

impl<const N: usize> AcqBuffer<N> {
    /// Number of `u16` cells in the whole buffer.
    pub const CELLS: usize = 2 * N * CHANNELS;

    const N_VALID: () = assert!(N >= 2 && N <= 16);

    #[allow(clippy::let_unit_value)]
    pub const fn new() -> Self {
        let () = Self::N_VALID;
        Self {
            halves: [const { [const { [const { AtomicU16::new(0) }; CHANNELS] }; N] }; 2],
        }
    }

    /// Start address of the buffer for the DMA memory address register.
    pub fn dma_addr(&self) -> *const u16 {
        self.halves.as_ptr().cast()
    }

    /// Split the completed `half` into one run per channel.
    ///
    /// Must complete before DMA wraps around into `half` again.
    #[inline(never)]
    pub fn deinterleave(&self, half: Half) -> ChannelRuns<N> {
        let mut runs = ChannelRuns::new();
        for (i, scan) in self.halves[half.index()].iter().enumerate() {
            for chan in Channel::ALL {
                runs.runs[chan.index()][i] = scan[chan.index()].load(Ordering::Relaxed);
            }
        }
        runs
    }

    /// Store one sample like the DMA engine would.
    #[cfg(test)]
    pub(crate) fn store(&self, half: Half, scan: usize, chan: Channel, value: u16) {
        self.halves[half.index()][scan][chan.index()].store(value, Ordering::Relaxed);
    }
}

impl<const N: usize> Default for AcqBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pattern(chan: Channel, scan: usize) -> u16 {
        (chan.index() as u16 + 1) * 1000 + scan as u16
    }

    #[test]
    fn test_layout() {
        assert_eq!(AcqBuffer::<8>::CELLS, 64);
        assert_eq!(core::mem::size_of::<AcqBuffer<8>>(), 64 * 2);
        assert_eq!(core::mem::size_of::<AcqBuffer<2>>(), 16 * 2);
        assert_eq!(core::mem::size_of::<AcqBuffer<16>>(), 128 * 2);
    }

    #[test]
    fn test_deinterleave() {
        let buf = AcqBuffer::<4>::new();
        for scan in 0..4 {
            for chan in Channel::ALL {
                buf.store(Half::First, scan, chan, pattern(chan, scan));
                buf.store(Half::Second, scan, chan, pattern(chan, scan) + 100);
            }
        }

        let runs = buf.deinterleave(Half::First);
        assert_eq!(runs.run(Channel::Current), &[1000, 1001, 1002, 1003]);
        assert_eq!(runs.run(Channel::Voltage), &[2000, 2001, 2002, 2003]);
        assert_eq!(runs.run(Channel::Knob), &[3000, 3001, 3002, 3003]);
        assert_eq!(runs.run(Channel::VRef), &[4000, 4001, 4002, 4003]);

        let runs = buf.deinterleave(Half::Second);
        assert_eq!(runs.run(Channel::Current), &[1100, 1101, 1102, 1103]);
        assert_eq!(runs.run(Channel::VRef), &[4100, 4101, 4102, 4103]);
    }

    #[test]
    fn test_deinterleave_raw_memory() {
        // Write through the DMA address, cell by cell,
        // in the order the DMA engine does.
        let buf = AcqBuffer::<16>::new();
        let cells = buf.dma_addr() as *const AtomicU16;
        for i in 0..AcqBuffer::<16>::CELLS {
            // SAFETY: `i` is within the buffer and AtomicU16 has the layout of u16.
            let cell = unsafe { &*cells.add(i) };
            cell.store(i as u16, Ordering::Relaxed);
        }

        let first = buf.deinterleave(Half::First);
        let second = buf.deinterleave(Half::Second);
        for chan in Channel::ALL {
            for scan in 0..16 {
                let cell = (scan * CHANNELS + chan.index()) as u16;
                assert_eq!(first.run(chan)[scan], cell);
                assert_eq!(second.run(chan)[scan], cell + 64);
            }
        }
    }

    #[test]
    fn test_half() {
        assert_eq!(Half::First.index(), 0);
        assert_eq!(Half::Second.index(), 1);
    }
}

// vim: ts=4 sw=4 expandtab
