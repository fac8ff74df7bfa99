// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    buffer::{AcqBuffer, ChannelRuns, Half},
    context::IrqCtx,
};

/// DMA completion events, as delivered by the hardware driver.
pub trait CompletionHandler {
    /// The first half of the buffer has been filled.
    fn on_half_complete(&self, c: &IrqCtx<'_>);

    /// The second half of the buffer has been filled.
    fn on_full_complete(&self, c: &IrqCtx<'_>);
}

/// Receiver of the deinterleaved runs.
///
/// Called in interrupt context. Must not block.
pub trait RunConsumer<const N: usize> {
    fn consume(&self, c: &IrqCtx<'_>, runs: ChannelRuns<N>);
}

/// Deinterleaves every completed buffer half and passes it on.
pub struct Pipeline<'a, const N: usize, C> {
    buf: &'a AcqBuffer<N>,
    consumer: &'a C,
}

impl<'a, const N: usize, C> Pipeline<'a, N, C> {
    pub const fn new(buf: &'a AcqBuffer<N>, consumer: &'a C) -> Self {
        Self { buf, consumer }
    }
}

impl<const N: usize, C: RunConsumer<N>> Pipeline<'_, N, C> {
    #[inline(always)]
    fn complete(&self, c: &IrqCtx<'_>, half: Half) {
        let runs = self.buf.deinterleave(half);
        self.consumer.consume(c, runs);
    }
}

impl<const N: usize, C: RunConsumer<N>> CompletionHandler for Pipeline<'_, N, C> {
    fn on_half_complete(&self, c: &IrqCtx<'_>) {
        self.complete(c, Half::First);
    }

    fn on_full_complete(&self, c: &IrqCtx<'_>) {
        self.complete(c, Half::Second);
    }
}


// vim: ts=4 sw=4 expandtab
