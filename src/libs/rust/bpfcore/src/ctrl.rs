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

//! The control register of the core and its lifecycle
//!
//! The control register is a single 64-bit register with the following layout (LSB first):
//!
//! ```text
//!  0..4   reg_dst     destination GPR for register writes
//!  4      reg_write   latch the input register into reg_dst (driver)
//!  5      sleep       sleep request (driver)
//!  6      sleeping    the core is sleeping (hardware)
//!  7      exception   the program faulted (hardware)
//!  8      finish      the program finished (hardware)
//!  9      reset       reset the core (driver)
//! 10..64  reserved
//! ```
//!
//! The status bits are driven by the hardware. Writing them has no effect and the request bits may
//! be cleared by the hardware at any time, so the register has to be read again after every write.

use bitflags::bitflags;

use core::fmt;

/// A core register
pub type Reg = u64;

const REG_DST_MASK: Reg = 0xF;

bitflags! {
    /// The single-bit fields of the control register
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct CtrlFlags : Reg {
        /// Latch the input register into the GPR given by reg_dst
        const REG_WRITE     = 1 << 4;
        /// Request the core to sleep
        const SLEEP         = 1 << 5;
        /// The core is sleeping
        const SLEEPING      = 1 << 6;
        /// The program caused an exception
        const EXCEPTION     = 1 << 7;
        /// The program finished
        const FINISH        = 1 << 8;
        /// Reset the core
        const RESET         = 1 << 9;

        /// The bits that are written by the hardware only
        const STATUS        = Self::SLEEPING.bits() | Self::EXCEPTION.bits() | Self::FINISH.bits();
        /// The bits that are written by the driver
        const REQUEST       = Self::REG_WRITE.bits() | Self::SLEEP.bits() | Self::RESET.bits();
    }
}

/// The lifecycle states of the core
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CoreState {
    /// The core is held in reset
    Reset,
    /// The core executes the loaded program
    Running,
    /// The core acknowledged a sleep request
    Sleeping,
    /// The program finished; terminal until reset
    Finished,
    /// The program faulted; terminal until reset
    Exception,
}

impl CoreState {
    /// Returns whether a new program may be loaded in this state
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Sleeping | Self::Finished | Self::Exception)
    }

    /// Returns whether the program has ended (only a reset leaves this state)
    pub fn is_terminated(self) -> bool {
        matches!(self, Self::Finished | Self::Exception)
    }

    /// Returns whether the core can go from `self` to `to`.
    ///
    /// A reset can be issued in every state. The start handshake holds the core asleep after the
    /// reset, so that Reset -> Sleeping is valid as well.
    pub fn can_become(self, to: CoreState) -> bool {
        self == to
            || to == Self::Reset
            || matches!(
                (self, to),
                (Self::Reset, Self::Running)
                    | (Self::Reset, Self::Sleeping)
                    | (Self::Running, Self::Sleeping)
                    | (Self::Running, Self::Finished)
                    | (Self::Running, Self::Exception)
                    | (Self::Sleeping, Self::Running)
            )
    }
}

/// The decoded control register
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct CtrlReg {
    reg_dst: u8,
    flags: CtrlFlags,
}

impl Default for CtrlReg {
    fn default() -> Self {
        Self::new(0, CtrlFlags::empty())
    }
}

impl CtrlReg {
    /// Creates a new control register value with given destination register and flags
    pub const fn new(reg_dst: u8, flags: CtrlFlags) -> Self {
        Self {
            reg_dst: reg_dst & REG_DST_MASK as u8,
            flags,
        }
    }

    /// Decodes the given raw register value; reserved bits are dropped
    pub const fn from_raw(raw: Reg) -> Self {
        Self::new((raw & REG_DST_MASK) as u8, CtrlFlags::from_bits_truncate(raw))
    }

    /// Encodes the register
    pub const fn raw(&self) -> Reg {
        (self.reg_dst as Reg & REG_DST_MASK) | self.flags.bits()
    }

    /// Returns the destination register for register writes
    pub fn reg_dst(&self) -> u8 {
        self.reg_dst
    }

    /// Sets the destination register for register writes (only the lower 4 bits are kept)
    pub fn set_reg_dst(&mut self, reg: u8) {
        self.reg_dst = reg & REG_DST_MASK as u8;
    }

    /// Returns all single-bit fields
    pub fn flags(&self) -> CtrlFlags {
        self.flags
    }

    /// Sets or clears the given flags
    pub fn set(&mut self, flags: CtrlFlags, value: bool) {
        self.flags.set(flags, value);
    }

    pub fn reg_write(&self) -> bool {
        self.flags.contains(CtrlFlags::REG_WRITE)
    }

    pub fn sleep(&self) -> bool {
        self.flags.contains(CtrlFlags::SLEEP)
    }

    pub fn sleeping(&self) -> bool {
        self.flags.contains(CtrlFlags::SLEEPING)
    }

    pub fn exception(&self) -> bool {
        self.flags.contains(CtrlFlags::EXCEPTION)
    }

    pub fn finish(&self) -> bool {
        self.flags.contains(CtrlFlags::FINISH)
    }

    pub fn reset(&self) -> bool {
        self.flags.contains(CtrlFlags::RESET)
    }

    /// Returns true if the core finished, faulted, or sleeps
    pub fn is_idle(&self) -> bool {
        self.flags.intersects(CtrlFlags::FINISH | CtrlFlags::EXCEPTION | CtrlFlags::SLEEPING)
    }

    /// Returns true if the core finished or faulted
    pub fn is_terminated(&self) -> bool {
        self.flags.intersects(CtrlFlags::FINISH | CtrlFlags::EXCEPTION)
    }

    /// Derives the lifecycle state from the status and request bits.
    ///
    /// An exception takes precedence over finish, which takes precedence over sleeping.
    pub fn state(&self) -> CoreState {
        if self.exception() {
            CoreState::Exception
        }
        else if self.finish() {
            CoreState::Finished
        }
        else if self.sleeping() {
            CoreState::Sleeping
        }
        else if self.reset() {
            CoreState::Reset
        }
        else {
            CoreState::Running
        }
    }
}

impl fmt::Debug for CtrlReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CtrlReg[dst={}, wr={}, slp={}, slpng={}, exc={}, fin={}, rst={}]",
            self.reg_dst,
            self.reg_write() as u8,
            self.sleep() as u8,
            self.sleeping() as u8,
            self.exception() as u8,
            self.finish() as u8,
            self.reset() as u8,
        )
    }
}
