/*
 * This file is part of bpfcore, the host-side driver for the FPGA eBPF core.
 *
 * bpfcore is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License version 2 as
 * published by the Free Software Foundation.
 *
 * bpfcore is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU
 * General Public License version 2 for more details.
 */

use core::ptr::{read_volatile, write_volatile};

use crate::arch::Bus;
use crate::cfg;

/// The memory-mapped register window of the core
#[derive(Clone, Copy)]
pub struct MmioWindow {
    base: usize,
}

impl MmioWindow {
    /// Creates a new window at the given base address
    ///
    /// # Safety
    ///
    /// The caller must ensure that `base` points to the mapped register window of the core with
    /// device (non-cacheable) memory attributes, spanning [`cfg::WINDOW_SIZE`] bytes, and that no
    /// other code accesses the window concurrently.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Returns the base address of the window
    pub const fn base(&self) -> usize {
        self.base
    }

    #[inline(always)]
    fn addr<T>(&self, off: usize) -> *mut T {
        let size = core::mem::size_of::<T>();
        debug_assert!(off + size <= cfg::WINDOW_SIZE, "MMIO offset {:#x} out of bounds", off);
        debug_assert!(off % size == 0, "MMIO offset {:#x} not aligned", off);
        (self.base + off) as *mut T
    }
}

impl Bus for MmioWindow {
    #[inline(always)]
    fn read8(&self, off: usize) -> u8 {
        // safety: the creator of the window guarantees that it is valid MMIO
        unsafe { read_volatile(self.addr(off)) }
    }

    #[inline(always)]
    fn read16(&self, off: usize) -> u16 {
        // safety: as above
        unsafe { read_volatile(self.addr(off)) }
    }

    #[inline(always)]
    fn read32(&self, off: usize) -> u32 {
        // safety: as above
        unsafe { read_volatile(self.addr(off)) }
    }

    #[inline(always)]
    fn read64(&self, off: usize) -> u64 {
        // safety: as above
        unsafe { read_volatile(self.addr(off)) }
    }

    #[inline(always)]
    fn write8(&self, off: usize, val: u8) {
        // safety: as above
        unsafe { write_volatile(self.addr(off), val) }
    }

    #[inline(always)]
    fn write16(&self, off: usize, val: u16) {
        // safety: as above
        unsafe { write_volatile(self.addr(off), val) }
    }

    #[inline(always)]
    fn write32(&self, off: usize, val: u32) {
        // safety: as above
        unsafe { write_volatile(self.addr(off), val) }
    }

    #[inline(always)]
    fn write64(&self, off: usize, val: u64) {
        // safety: as above
        unsafe { write_volatile(self.addr(off), val) }
    }
}

impl core::fmt::Debug for MmioWindow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "MmioWindow[base={:#x}, size={:#x}]", self.base, cfg::WINDOW_SIZE)
    }
}
