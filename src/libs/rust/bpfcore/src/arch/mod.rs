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

//! Access to the core's register window
//!
//! The driver talks to the hardware exclusively through the [`Bus`] trait. On the target, the
//! implementation is [`MmioWindow`], which performs single volatile loads and stores. On the host,
//! [`SimCore`] models the core in software.

use cfg_if::cfg_if;

mod mmio;

pub use self::mmio::MmioWindow;

cfg_if! {
    if #[cfg(feature = "std")] {
        mod host;

        pub use self::host::{Outcome, SimCore};
    }
}

/// Reads and writes of the register window at byte offsets.
///
/// Every call corresponds to exactly one bus transaction of the given width. Implementations do not
/// check bounds or alignment; offsets have to be within the window and naturally aligned.
pub trait Bus {
    /// Reads 1 byte from `off`
    fn read8(&self, off: usize) -> u8;
    /// Reads 2 bytes from `off`
    fn read16(&self, off: usize) -> u16;
    /// Reads 4 bytes from `off`
    fn read32(&self, off: usize) -> u32;
    /// Reads 8 bytes from `off`
    fn read64(&self, off: usize) -> u64;

    /// Writes `val` as 1 byte to `off`
    fn write8(&self, off: usize, val: u8);
    /// Writes `val` as 2 bytes to `off`
    fn write16(&self, off: usize, val: u16);
    /// Writes `val` as 4 bytes to `off`
    fn write32(&self, off: usize, val: u32);
    /// Writes `val` as 8 bytes to `off`
    fn write64(&self, off: usize, val: u64);
}

impl<B: Bus + ?Sized> Bus for &B {
    fn read8(&self, off: usize) -> u8 {
        (**self).read8(off)
    }

    fn read16(&self, off: usize) -> u16 {
        (**self).read16(off)
    }

    fn read32(&self, off: usize) -> u32 {
        (**self).read32(off)
    }

    fn read64(&self, off: usize) -> u64 {
        (**self).read64(off)
    }

    fn write8(&self, off: usize, val: u8) {
        (**self).write8(off, val)
    }

    fn write16(&self, off: usize, val: u16) {
        (**self).write16(off, val)
    }

    fn write32(&self, off: usize, val: u32) {
        (**self).write32(off, val)
    }

    fn write64(&self, off: usize, val: u64) {
        (**self).write64(off, val)
    }
}
