use crate::context::{CriticalSection, Mutex};
use core::cell::Cell;

/// Bounded FIFO between interrupt context (producer)
/// and `main()` context (consumer).
///
/// `SIZE` must be a power of two and at most 128.
pub struct Ring<T, const SIZE: usize> {
    buf: [Mutex<Cell<T>>; SIZE],
    wr: Mutex<Cell<u8>>,
    rd: Mutex<Cell<u8>>,
    lost: Mutex<Cell<u16>>,
}

impl<T, const SIZE: usize> Ring<T, SIZE> {
    const MASK: u8 = (SIZE - 1) as u8;

    const SIZE_VALID: () = assert!(SIZE.is_power_of_two() && SIZE <= 128);

    #[allow(clippy::let_unit_value)]
    pub const fn new(buf: [Mutex<Cell<T>>; SIZE]) -> Self {
        let () = Self::SIZE_VALID;
        Self {
            buf,
            wr: Mutex::new(Cell::new(0)),
            rd: Mutex::new(Cell::new(0)),
            lost: Mutex::new(Cell::new(0)),
        }
    }
}

impl<T: Copy, const SIZE: usize> Ring<T, SIZE> {
    fn count<'cs>(&self, cs: CriticalSection<'cs>) -> u8 {
        let wr = self.wr.borrow(cs).get();
        let rd = self.rd.borrow(cs).get();
        wr.wrapping_sub(rd)
    }

    fn is_full<'cs>(&self, cs: CriticalSection<'cs>) -> bool {
        self.count(cs) >= SIZE as _
    }

    fn is_empty<'cs>(&self, cs: CriticalSection<'cs>) -> bool {
        self.count(cs) == 0
    }

    /// Append `value`. Never blocks.
    ///
    /// If the ring is full, `value` is dropped and `false` is returned.
    pub fn insert<'cs>(&self, cs: CriticalSection<'cs>, value: T) -> bool {
        if self.is_full(cs) {
            let lost = self.lost.borrow(cs);
            lost.set(lost.get().saturating_add(1));
            false
        } else {
            let wr = self.wr.borrow(cs).get();
            self.buf[(wr & Self::MASK) as usize].borrow(cs).set(value);
            let wr = wr.wrapping_add(1);
            self.wr.borrow(cs).set(wr);
            true
        }
    }

    /// Remove and return the oldest value.
    pub fn get<'cs>(&self, cs: CriticalSection<'cs>) -> Option<T> {
        if self.is_empty(cs) {
            None
        } else {
            let rd = self.rd.borrow(cs).get();
            let value = self.buf[(rd & Self::MASK) as usize].borrow(cs).get();
            let rd = rd.wrapping_add(1);
            self.rd.borrow(cs).set(rd);
            Some(value)
        }
    }

    /// Number of values dropped by [Self::insert] so far.
    pub fn lost<'cs>(&self, cs: CriticalSection<'cs>) -> u16 {
        self.lost.borrow(cs).get()
    }
}


// vim: ts=4 sw=4 expandtab
