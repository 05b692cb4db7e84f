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

//! A software model of the core for running the driver on the host
//!
//! The model keeps the whole register window in memory and reacts to accesses of the control and
//! input register like the hardware does: a reset clears the status and the GPRs, a sleep request
//! is acknowledged after a configurable number of control-register polls, a register write latches
//! the input register into `reg_dst` while the core is held asleep, and releasing the core runs a
//! scripted program that ends after a configurable number of polls.

use std::cell::RefCell;
use std::vec::Vec;

use crate::arch::Bus;
use crate::cfg;
use crate::ctrl::{CoreState, CtrlFlags, CtrlReg};

/// The number of general-purpose registers of the core
pub const GPRS: usize = 16;

/// The way the simulated program ends
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The program finishes with the given return value
    Finish(u64),
    /// The program faults at the given program counter
    Exception(u64),
}

struct Model {
    ctrl: CtrlReg,
    gprs: [u64; GPRS],
    outcome: Outcome,
    run_polls: u32,
    sleep_delay: u32,
    remaining: u32,
    pending_sleep: Option<u32>,
    ctrl_reads: u64,
    ctrl_writes: Vec<CtrlReg>,
    transitions: Vec<(CoreState, CoreState)>,
}

impl Model {
    fn switch(&mut self, ctrl: CtrlReg) {
        let (old, new) = (self.ctrl.state(), ctrl.state());
        if old != new {
            self.transitions.push((old, new));
        }
        self.ctrl = ctrl;
    }

    fn set_status(&mut self, status: CtrlFlags) {
        let mut ctrl = self.ctrl;
        ctrl.set(CtrlFlags::STATUS, false);
        ctrl.set(status, true);
        self.switch(ctrl);
    }
}

/// The simulated core
pub struct SimCore {
    mem: RefCell<Vec<u8>>,
    model: RefCell<Model>,
}

impl SimCore {
    /// Creates a new core that sleeps (and is therefore idle) and runs programs that end with
    /// `outcome` right after they have been released.
    pub fn new(outcome: Outcome) -> Self {
        Self {
            mem: RefCell::new(vec![0; cfg::WINDOW_SIZE]),
            model: RefCell::new(Model {
                ctrl: CtrlReg::new(0, CtrlFlags::SLEEPING),
                gprs: [0; GPRS],
                outcome,
                run_polls: 0,
                sleep_delay: 0,
                remaining: 0,
                pending_sleep: None,
                ctrl_reads: 0,
                ctrl_writes: Vec::new(),
                transitions: Vec::new(),
            }),
        }
    }

    /// Lets programs run for `polls` control-register reads before they end
    pub fn with_run_polls(self, polls: u32) -> Self {
        self.model.borrow_mut().run_polls = polls;
        self
    }

    /// Acknowledges sleep requests after `polls` control-register reads
    pub fn with_sleep_delay(self, polls: u32) -> Self {
        self.model.borrow_mut().sleep_delay = polls;
        self
    }

    /// Changes the outcome of the next program run
    pub fn set_outcome(&self, outcome: Outcome) {
        self.model.borrow_mut().outcome = outcome;
    }

    /// Puts the core into the running state, executing a program for `polls` polls
    pub fn set_running(&self, polls: u32) {
        let mut model = self.model.borrow_mut();
        model.remaining = polls;
        model.pending_sleep = None;
        let mut ctrl = model.ctrl;
        ctrl.set(CtrlFlags::STATUS | CtrlFlags::REQUEST, false);
        model.switch(ctrl);
    }

    /// Sets the status bits (sleeping, exception, finish) to `status`, as the hardware would do
    pub fn set_status(&self, status: CtrlFlags) {
        self.model.borrow_mut().set_status(status & CtrlFlags::STATUS);
    }

    /// Returns the control register without counting it as a poll
    pub fn ctrl(&self) -> CtrlReg {
        self.model.borrow().ctrl
    }

    /// Returns the value of the given general-purpose register
    pub fn gpr(&self, idx: usize) -> u64 {
        self.model.borrow().gprs[idx]
    }

    /// Returns the number of control-register reads so far
    pub fn ctrl_reads(&self) -> u64 {
        self.model.borrow().ctrl_reads
    }

    /// Returns all values that have been written to the control register so far
    pub fn ctrl_writes(&self) -> Vec<CtrlReg> {
        self.model.borrow().ctrl_writes.clone()
    }

    /// Returns all state transitions the core went through so far
    pub fn transitions(&self) -> Vec<(CoreState, CoreState)> {
        self.model.borrow().transitions.clone()
    }

    /// Returns the instruction word at index `idx` of the instruction memory
    pub fn instr(&self, idx: usize) -> u64 {
        self.load(cfg::INSTR_MEM_BASE + idx * cfg::INSTR_SIZE, 8)
    }

    fn load(&self, off: usize, size: usize) -> u64 {
        let mem = self.mem.borrow();
        let mut bytes = [0u8; 8];
        bytes[..size].copy_from_slice(&mem[off..off + size]);
        u64::from_le_bytes(bytes)
    }

    fn store(&self, off: usize, size: usize, val: u64) {
        let mut mem = self.mem.borrow_mut();
        mem[off..off + size].copy_from_slice(&val.to_le_bytes()[..size]);
    }

    fn finish_run(&self, model: &mut Model) {
        let (status, output) = match model.outcome {
            Outcome::Finish(res) => (CtrlFlags::FINISH, res),
            Outcome::Exception(pc) => (CtrlFlags::EXCEPTION, pc),
        };
        model.pending_sleep = None;
        model.set_status(status);
        self.store(cfg::CORE_OUTPUT, 8, output);
    }

    fn poll_ctrl(&self) -> u64 {
        let mut model = self.model.borrow_mut();
        model.ctrl_reads += 1;

        if model.ctrl.state() == CoreState::Running {
            if model.remaining == 0 {
                self.finish_run(&mut model);
            }
            else {
                model.remaining -= 1;
                let pending = model.pending_sleep;
                if let Some(delay) = pending {
                    if delay == 0 {
                        model.pending_sleep = None;
                        model.set_status(CtrlFlags::SLEEPING);
                    }
                    else {
                        model.pending_sleep = Some(delay - 1);
                    }
                }
            }
        }
        model.ctrl.raw()
    }

    fn write_ctrl(&self, raw: u64) {
        let mut model = self.model.borrow_mut();
        let req = CtrlReg::from_raw(raw);
        model.ctrl_writes.push(req);

        let old = model.ctrl;
        // the status bits are owned by the hardware
        let mut ctrl = CtrlReg::new(req.reg_dst(), req.flags() & CtrlFlags::REQUEST);
        ctrl.set(old.flags() & CtrlFlags::STATUS, true);

        if req.reset() {
            ctrl.set(CtrlFlags::STATUS, false);
            model.gprs = [0; GPRS];
            model.pending_sleep = None;
            model.remaining = model.run_polls;
            drop(model);
            self.store(cfg::CORE_OUTPUT, 8, 0);
            self.model.borrow_mut().switch(ctrl);
            return;
        }

        if req.sleep() {
            if old.state() == CoreState::Reset || model.sleep_delay == 0 {
                if !ctrl.is_terminated() {
                    ctrl.set(CtrlFlags::SLEEPING, true);
                }
            }
            else if old.state() == CoreState::Running && model.pending_sleep.is_none() {
                model.pending_sleep = Some(model.sleep_delay);
            }
        }
        else if ctrl.sleeping() && !ctrl.is_terminated() {
            ctrl.set(CtrlFlags::SLEEPING, false);
            model.pending_sleep = None;
        }
        model.switch(ctrl);
    }

    fn write_input(&self, val: u64) {
        let mut model = self.model.borrow_mut();
        let ctrl = model.ctrl;
        if ctrl.reg_write() && ctrl.sleeping() {
            model.gprs[ctrl.reg_dst() as usize] = val;
        }
    }
}

impl Bus for SimCore {
    fn read8(&self, off: usize) -> u8 {
        self.load(off, 1) as u8
    }

    fn read16(&self, off: usize) -> u16 {
        self.load(off, 2) as u16
    }

    fn read32(&self, off: usize) -> u32 {
        self.load(off, 4) as u32
    }

    fn read64(&self, off: usize) -> u64 {
        match off {
            cfg::CORE_CTRL => self.poll_ctrl(),
            _ => self.load(off, 8),
        }
    }

    fn write8(&self, off: usize, val: u8) {
        self.store(off, 1, val as u64)
    }

    fn write16(&self, off: usize, val: u16) {
        self.store(off, 2, val as u64)
    }

    fn write32(&self, off: usize, val: u32) {
        self.store(off, 4, val as u64)
    }

    fn write64(&self, off: usize, val: u64) {
        self.store(off, 8, val);
        match off {
            cfg::CORE_CTRL => self.write_ctrl(val),
            cfg::CORE_INPUT => self.write_input(val),
            _ => {},
        }
    }
}
