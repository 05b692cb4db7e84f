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

use bpfcore::test::{DefaultWvTester, WvTester};
use bpfcore::wv_run_suite;

mod tctrl;
mod tlog;
mod tmmio;

#[test]
fn unittests() {
    let mut tester = DefaultWvTester::default();
    wv_run_suite!(tester, tctrl::run);
    wv_run_suite!(tester, tload::run);
    wv_run_suite!(tester, texec::run);
    wv_run_suite!(tester, tmaps::run);
    wv_run_suite!(tester, tmmio::run);
    wv_run_suite!(tester, tlog::run);
    println!("{:?}", tester);
    assert_eq!(tester.failures(), 0, "{} of {} checks failed", tester.failures(), tester.tests());
}
