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

use bpfcore::errors::Code;
use bpfcore::io::{log, LogFlags};
use bpfcore::test::WvTester;
use bpfcore::{wv_assert, wv_assert_eq, wv_assert_err, wv_assert_ok, wv_run_test};

pub fn run(t: &mut dyn WvTester) {
    wv_run_test!(t, parse_flags);
    wv_run_test!(t, set_flags);
    wv_run_test!(t, levels);
    wv_run_test!(t, init);
}

fn parse_flags(t: &mut dyn WvTester) {
    let flags: LogFlags = wv_assert_ok!("Info|Maps".parse());
    wv_assert_eq!(t, flags, LogFlags::Info | LogFlags::Maps);

    let flags: LogFlags = wv_assert_ok!("CoreCtrl | CoreExec".parse());
    wv_assert_eq!(t, flags, LogFlags::CoreCtrl | LogFlags::CoreExec);

    wv_assert!(t, "Info|Bogus".parse::<LogFlags>().is_err());
}

fn set_flags(t: &mut dyn WvTester) {
    let old = log::flags();
    wv_assert!(t, old.contains(LogFlags::Info | LogFlags::Error));

    log::set_flags(LogFlags::MapLookups);
    wv_assert_eq!(t, log::flags(), LogFlags::MapLookups);

    // every defined flag survives the round trip through the flag storage
    log::set_flags(LogFlags::all());
    wv_assert_eq!(t, log::flags(), LogFlags::all());
    wv_assert_eq!(t, log::flags().bits(), LogFlags::all().bits());

    log::set_flags(old);
    wv_assert_eq!(t, log::flags(), old);
}

fn levels(t: &mut dyn WvTester) {
    wv_assert_eq!(t, log::level(LogFlags::Error), ::log::Level::Error);
    wv_assert_eq!(t, log::level(LogFlags::Info), ::log::Level::Info);
    wv_assert_eq!(t, log::level(LogFlags::Maps), ::log::Level::Debug);
    wv_assert_eq!(t, log::level(LogFlags::CoreExec), ::log::Level::Debug);
}

fn init(t: &mut dyn WvTester) {
    let old = log::flags();

    std::env::set_var("BPF_LOG", "Info|Nope");
    wv_assert_err!(t, log::init(), Code::InvArgs);
    wv_assert_eq!(t, log::flags(), old);

    std::env::set_var("BPF_LOG", "Info|Error|Maps");
    wv_assert_ok!(log::init());
    wv_assert_eq!(t, log::flags(), LogFlags::Info | LogFlags::Error | LogFlags::Maps);
    wv_assert_err!(t, log::init(), Code::Exists);

    std::env::remove_var("BPF_LOG");
    log::set_flags(old);
}
