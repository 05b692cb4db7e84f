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

//! Program loading and execution control

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::arch::Bus;
use crate::cfg;
use crate::ctrl::{CoreState, CtrlFlags, CtrlReg};
use crate::errors::{Code, Error};
use crate::io::LogFlags;

/// An instruction word of the core. Its encoding is defined by the core, not by the driver.
pub type Instr = u64;

/// The reason why a program stopped
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum EndCause {
    /// The program finished; the result register holds its return value
    Finish = 0,
    /// The program faulted; the result register holds the faulting program counter
    Exception = -1,
}

/// The interface to the core
///
/// All waiting operations poll the control register without a timeout. If the core never
/// responds, they never return.
pub struct Core<B: Bus> {
    bus: B,
}

impl<B: Bus> Core<B> {
    /// Creates a new interface to the core behind `bus`
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Returns the bus to the core's register window
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Reads and decodes the control register
    pub fn get_ctrl(&self) -> CtrlReg {
        CtrlReg::from_raw(self.bus.read64(cfg::CORE_CTRL))
    }

    /// Encodes and writes the control register.
    ///
    /// The status bits of `ctrl` are ignored by the hardware.
    pub fn set_ctrl(&self, ctrl: CtrlReg) {
        log!(LogFlags::CoreCtrl, "ctrl <- {:?}", ctrl);
        self.bus.write64(cfg::CORE_CTRL, ctrl.raw());
    }

    /// Returns the current lifecycle state of the core
    pub fn state(&self) -> CoreState {
        self.get_ctrl().state()
    }

    /// Returns whether the core is idle, i.e., sleeping, finished, or faulted
    pub fn is_idle(&self) -> bool {
        self.get_ctrl().is_idle()
    }

    /// Loads the given program into the instruction memory.
    ///
    /// The instructions are written in order, starting at address 0. Instructions of a previous
    /// program beyond `prog.len()` stay in place.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`](Code::OutOfBounds) if the program does not fit into the instruction
    /// memory and [`NotIdle`](Code::NotIdle) if the core is not idle. In both cases, the
    /// instruction memory is left untouched.
    pub fn load_program(&self, prog: &[Instr]) -> Result<(), Error> {
        if prog.len() > cfg::MAX_INSTRS {
            return Err(Error::new(Code::OutOfBounds));
        }

        let ctrl = self.get_ctrl();
        if !ctrl.is_idle() {
            log!(LogFlags::CoreLoad, "cannot load program: core not idle ({:?})", ctrl);
            return Err(Error::new(Code::NotIdle));
        }

        for (i, instr) in prog.iter().enumerate() {
            self.bus
                .write64(cfg::INSTR_MEM_BASE + i * cfg::INSTR_SIZE, *instr);
        }

        log!(LogFlags::CoreLoad, "loaded program with {} instructions", prog.len());
        Ok(())
    }

    /// Starts the loaded program from address 0.
    ///
    /// Resets the core, loads the frame pointer into its GPR while the core is held asleep, and
    /// releases it. The hardware latches the input register according to reg_write/reg_dst at the
    /// time the input register is written, so the order of the steps matters.
    pub fn start(&self) {
        // start over
        let mut ctrl = CtrlReg::new(0, CtrlFlags::RESET);
        self.set_ctrl(ctrl);

        // load frame pointer
        ctrl.set(CtrlFlags::RESET, false);
        ctrl.set(CtrlFlags::SLEEP | CtrlFlags::REG_WRITE, true);
        ctrl.set_reg_dst(cfg::FRAME_POINTER_REG);
        self.set_ctrl(ctrl);
        self.bus.write64(cfg::CORE_INPUT, cfg::FRAME_POINTER);

        // start execution
        ctrl.set(CtrlFlags::SLEEP | CtrlFlags::REG_WRITE, false);
        self.set_ctrl(ctrl);

        log!(LogFlags::CoreExec, "started program");
    }

    /// Puts the core to sleep and waits until it stopped, spinning in between.
    ///
    /// See [`sleep_with`](Self::sleep_with).
    pub fn sleep(&self) -> CoreState {
        self.sleep_with(|_| core::hint::spin_loop())
    }

    /// Puts the core to sleep and waits until it stopped.
    ///
    /// Does nothing if the core is already idle. Otherwise, requests sleep and polls the control
    /// register until the core sleeps, finished, or faulted. `poll` is called with the last read
    /// value after every unsuccessful poll. Returns the state the core stopped in.
    pub fn sleep_with<F>(&self, mut poll: F) -> CoreState
    where
        F: FnMut(CtrlReg),
    {
        let mut ctrl = self.get_ctrl();
        if ctrl.is_idle() {
            return ctrl.state();
        }

        ctrl.set(CtrlFlags::RESET | CtrlFlags::REG_WRITE, false);
        ctrl.set(CtrlFlags::SLEEP, true);
        self.set_ctrl(ctrl);

        let state = self.poll_until(&mut poll, |c| c.is_idle()).state();
        log!(LogFlags::CoreExec, "core stopped: {:?}", state);
        state
    }

    /// Wakes up the core after [`sleep`](Self::sleep).
    ///
    /// # Errors
    ///
    /// Returns [`Terminated`](Code::Terminated) if the program already finished or faulted, which
    /// can only be left by starting the program again.
    pub fn awake(&self) -> Result<(), Error> {
        let mut ctrl = self.get_ctrl();
        if ctrl.is_terminated() {
            return Err(Error::new(Code::Terminated));
        }

        ctrl.set(CtrlFlags::SLEEP, false);
        self.set_ctrl(ctrl);
        log!(LogFlags::CoreExec, "woke up core");
        Ok(())
    }

    /// Waits until the program finished or faulted, spinning in between.
    ///
    /// See [`await_program_with`](Self::await_program_with).
    pub fn await_program(&self) -> Result<EndCause, Error> {
        self.await_program_with(|_| core::hint::spin_loop())
    }

    /// Waits until the program finished or faulted.
    ///
    /// Polls the control register and calls `poll` with the last read value after every
    /// unsuccessful poll. If both the exception and the finish bit are set, the exception wins. A
    /// core that sleeps without a pending sleep request is still considered to be on its way and is
    /// polled further.
    ///
    /// # Errors
    ///
    /// Returns [`Sleeping`](Code::Sleeping) if the core sleeps because it has been put to sleep via
    /// [`sleep`](Self::sleep), since it would never end in that case.
    pub fn await_program_with<F>(&self, mut poll: F) -> Result<EndCause, Error>
    where
        F: FnMut(CtrlReg),
    {
        let ctrl = self.poll_until(&mut poll, |c| {
            c.is_terminated() || (c.sleeping() && c.sleep())
        });

        let res = if ctrl.exception() {
            Ok(EndCause::Exception)
        }
        else if ctrl.finish() {
            Ok(EndCause::Finish)
        }
        else {
            Err(Error::new(Code::Sleeping))
        };
        log!(LogFlags::CoreExec, "program ended: {:?}", res);
        res
    }

    /// Returns the result register.
    ///
    /// After [`EndCause::Finish`], this is the return value of the program. After
    /// [`EndCause::Exception`], this is the program counter of the faulting instruction.
    pub fn get_result(&self) -> u64 {
        self.bus.read64(cfg::CORE_OUTPUT)
    }

    fn poll_until<F, C>(&self, poll: &mut F, cond: C) -> CtrlReg
    where
        F: FnMut(CtrlReg),
        C: Fn(&CtrlReg) -> bool,
    {
        let mut last: Option<CoreState> = None;
        loop {
            let ctrl = self.get_ctrl();
            let state = ctrl.state();
            if let Some(prev) = last.filter(|prev| *prev != state) {
                if !prev.can_become(state) {
                    log!(
                        LogFlags::Error,
                        "unexpected state change {:?} -> {:?}",
                        prev,
                        state
                    );
                }
                log!(LogFlags::CoreCtrl, "state {:?} -> {:?}", prev, state);
            }
            last = Some(state);

            if cond(&ctrl) {
                break ctrl;
            }
            poll(ctrl);
        }
    }
}
