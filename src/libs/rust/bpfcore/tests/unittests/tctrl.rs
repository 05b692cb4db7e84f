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

use bpfcore::arch::{Outcome, SimCore};
use bpfcore::ctrl::{CoreState, CtrlFlags, CtrlReg};
use bpfcore::test::WvTester;
use bpfcore::{wv_assert, wv_assert_eq, wv_run_test, Core};

pub fn run(t: &mut dyn WvTester) {
    wv_run_test!(t, decode);
    wv_run_test!(t, encode);
    wv_run_test!(t, reg_dst_width);
    wv_run_test!(t, states);
    wv_run_test!(t, transitions);
    wv_run_test!(t, status_not_writable);
}

fn decode(t: &mut dyn WvTester) {
    let raw = 0xA | (1 << 5) | (1 << 8) | (1 << 40);
    let ctrl = CtrlReg::from_raw(raw);
    wv_assert_eq!(t, ctrl.reg_dst(), 10);
    wv_assert!(t, ctrl.sleep());
    wv_assert!(t, ctrl.finish());
    wv_assert!(t, !ctrl.reg_write());
    wv_assert!(t, !ctrl.sleeping());
    wv_assert!(t, !ctrl.exception());
    wv_assert!(t, !ctrl.reset());
    // reserved bits are dropped
    wv_assert_eq!(t, ctrl.raw(), 0xA | (1 << 5) | (1 << 8));
}

fn encode(t: &mut dyn WvTester) {
    let ctrl = CtrlReg::new(10, CtrlFlags::SLEEP | CtrlFlags::REG_WRITE);
    wv_assert_eq!(t, ctrl.raw(), 0x3A);

    let mut ctrl = CtrlReg::default();
    wv_assert_eq!(t, ctrl.raw(), 0);
    ctrl.set(CtrlFlags::RESET, true);
    wv_assert_eq!(t, ctrl.raw(), 1 << 9);
    ctrl.set(CtrlFlags::RESET, false);
    ctrl.set(CtrlFlags::EXCEPTION, true);
    wv_assert_eq!(t, ctrl.raw(), 1 << 7);
    wv_assert_eq!(t, CtrlReg::from_raw(ctrl.raw()), ctrl);
}

fn reg_dst_width(t: &mut dyn WvTester) {
    let mut ctrl = CtrlReg::default();
    ctrl.set_reg_dst(0x1F);
    wv_assert_eq!(t, ctrl.reg_dst(), 0xF);
    wv_assert_eq!(t, ctrl.raw(), 0xF);
    wv_assert_eq!(t, CtrlReg::new(0x13, CtrlFlags::empty()).reg_dst(), 0x3);
}

fn states(t: &mut dyn WvTester) {
    let state = |flags: CtrlFlags| CtrlReg::new(0, flags).state();

    wv_assert_eq!(t, state(CtrlFlags::empty()), CoreState::Running);
    wv_assert_eq!(t, state(CtrlFlags::SLEEP), CoreState::Running);
    wv_assert_eq!(t, state(CtrlFlags::RESET), CoreState::Reset);
    wv_assert_eq!(t, state(CtrlFlags::SLEEPING), CoreState::Sleeping);
    wv_assert_eq!(t, state(CtrlFlags::FINISH), CoreState::Finished);
    wv_assert_eq!(t, state(CtrlFlags::EXCEPTION), CoreState::Exception);
    wv_assert_eq!(
        t,
        state(CtrlFlags::EXCEPTION | CtrlFlags::FINISH),
        CoreState::Exception
    );
    wv_assert_eq!(
        t,
        state(CtrlFlags::FINISH | CtrlFlags::SLEEPING),
        CoreState::Finished
    );

    for flags in [CtrlFlags::SLEEPING, CtrlFlags::FINISH, CtrlFlags::EXCEPTION] {
        let ctrl = CtrlReg::new(0, flags);
        wv_assert!(t, ctrl.is_idle());
        wv_assert!(t, ctrl.state().is_idle());
    }
    for flags in [CtrlFlags::empty(), CtrlFlags::RESET, CtrlFlags::SLEEP] {
        let ctrl = CtrlReg::new(0, flags);
        wv_assert!(t, !ctrl.is_idle());
        wv_assert!(t, !ctrl.state().is_idle());
    }

    wv_assert!(t, CtrlReg::new(0, CtrlFlags::FINISH).is_terminated());
    wv_assert!(t, !CtrlReg::new(0, CtrlFlags::SLEEPING).is_terminated());
}

fn transitions(t: &mut dyn WvTester) {
    use CoreState::*;

    wv_assert!(t, Reset.can_become(Running));
    wv_assert!(t, Running.can_become(Sleeping));
    wv_assert!(t, Sleeping.can_become(Running));
    wv_assert!(t, Running.can_become(Finished));
    wv_assert!(t, Running.can_become(Exception));
    wv_assert!(t, Finished.can_become(Reset));
    wv_assert!(t, Exception.can_become(Reset));

    wv_assert!(t, !Finished.can_become(Running));
    wv_assert!(t, !Exception.can_become(Sleeping));
    wv_assert!(t, !Reset.can_become(Finished));
    wv_assert!(t, !Sleeping.can_become(Finished));
}

fn status_not_writable(t: &mut dyn WvTester) {
    let sim = SimCore::new(Outcome::Finish(0));
    let core = Core::new(&sim);

    core.set_ctrl(CtrlReg::new(3, CtrlFlags::FINISH | CtrlFlags::SLEEP));
    wv_assert_eq!(t, sim.ctrl_writes().len(), 1);
    wv_assert_eq!(t, sim.ctrl_writes()[0].reg_dst(), 3);
    wv_assert!(t, !sim.ctrl().finish());
    wv_assert!(t, sim.ctrl().sleep());
    wv_assert_eq!(t, core.state(), CoreState::Sleeping);
}
