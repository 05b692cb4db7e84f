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

use bpfcore::cfg;
use bpfcore::ctrl::{CoreState, CtrlFlags};
use bpfcore::errors::Code;
use bpfcore::maps::{AllocState, MapAllocator, MapType};
use bpfcore::test::WvTester;
use bpfcore::{wv_assert, wv_assert_eq, wv_assert_err, wv_assert_ok, wv_run_test, Bus, Core, Instr, MmioWindow};

pub fn run(t: &mut dyn WvTester) {
    wv_run_test!(t, base_addr);
    wv_run_test!(t, sized_accesses);
    wv_run_test!(t, load_through_window);
    wv_run_test!(t, maps_through_window);
}

// backs the window with memory, 8-byte aligned like the register window
fn window_mem() -> Vec<u64> {
    vec![0; cfg::WINDOW_SIZE / 8]
}

fn window(mem: &mut [u64]) -> MmioWindow {
    // safety: the memory spans the whole window and outlives the returned window in all tests
    unsafe { MmioWindow::new(mem.as_mut_ptr() as usize) }
}

fn base_addr(t: &mut dyn WvTester) {
    // safety: the window is never accessed
    let win = unsafe { MmioWindow::new(cfg::DEF_BASE_ADDR) };
    wv_assert_eq!(t, win.base(), 0x43C0_0000);
    wv_assert_eq!(
        t,
        format!("{:?}", win),
        "MmioWindow[base=0x43c00000, size=0x10000]"
    );
}

fn sized_accesses(t: &mut dyn WvTester) {
    let mut mem = window_mem();
    let win = window(&mut mem);

    win.write8(cfg::PACKET_BASE, 0xA5);
    win.write16(cfg::PACKET_BASE + 2, 0xBEEF);
    win.write32(cfg::STACK_BASE, 0xDEAD_BEEF);
    win.write64(cfg::CORE_OUTPUT, 0x0123_4567_89AB_CDEF);
    win.write32(cfg::MAP_BASE + cfg::MAP_DESC_SIZE, 0x8000_1234);
    win.write64(cfg::WINDOW_SIZE - 8, u64::MAX);

    wv_assert_eq!(t, win.read8(cfg::PACKET_BASE), 0xA5);
    wv_assert_eq!(t, win.read8(cfg::PACKET_BASE + 1), 0);
    wv_assert_eq!(t, win.read16(cfg::PACKET_BASE + 2), 0xBEEF);
    wv_assert_eq!(t, win.read32(cfg::STACK_BASE), 0xDEAD_BEEF);
    wv_assert_eq!(t, win.read64(cfg::CORE_OUTPUT), 0x0123_4567_89AB_CDEF);
    wv_assert_eq!(t, win.read32(cfg::MAP_BASE + cfg::MAP_DESC_SIZE), 0x8000_1234);
    wv_assert_eq!(t, win.read32(cfg::MAP_BASE), 0);
    wv_assert_eq!(t, win.read64(cfg::WINDOW_SIZE - 8), u64::MAX);

    // narrow writes leave the neighbouring bytes alone
    win.write64(cfg::CORE_INPUT, 0);
    win.write8(cfg::CORE_INPUT + 3, 0xFF);
    win.write16(cfg::CORE_INPUT + 6, 0xFFFF);
    wv_assert_eq!(t, win.read8(cfg::CORE_INPUT + 2), 0);
    wv_assert_eq!(t, win.read8(cfg::CORE_INPUT + 3), 0xFF);
    wv_assert_eq!(t, win.read16(cfg::CORE_INPUT + 4), 0);
    wv_assert_eq!(t, win.read16(cfg::CORE_INPUT + 6), 0xFFFF);
}

fn load_through_window(t: &mut dyn WvTester) {
    let mut mem = window_mem();
    let win = window(&mut mem);
    let core = Core::new(win);

    let prog: [Instr; 3] = [0xb7, 0x1_0000_0007, 0x95];

    // nothing drives the status bits here; a cleared register reads as running
    wv_assert_eq!(t, core.state(), CoreState::Running);
    wv_assert_err!(t, core.load_program(&prog), Code::NotIdle);
    wv_assert_eq!(t, win.read64(cfg::INSTR_MEM_BASE), 0);

    win.write64(cfg::CORE_CTRL, CtrlFlags::SLEEPING.bits());
    wv_assert!(t, core.is_idle());
    wv_assert_ok!(core.load_program(&prog));
    for (i, instr) in prog.iter().enumerate() {
        let off = cfg::INSTR_MEM_BASE + i * cfg::INSTR_SIZE;
        wv_assert_eq!(t, win.read64(off), *instr, "instruction {} differs", i);
    }

    win.write64(cfg::CORE_OUTPUT, 42);
    wv_assert_eq!(t, core.get_result(), 42);

    core.set_ctrl(core.get_ctrl());
    wv_assert_eq!(t, win.read64(cfg::CORE_CTRL), CtrlFlags::SLEEPING.bits());
}

fn maps_through_window(t: &mut dyn WvTester) {
    let mut mem = window_mem();
    let win = window(&mut mem);
    let mut maps = MapAllocator::new();

    wv_assert_eq!(t, maps.create(&win, MapType::Array, 8, 64, 10), Ok(0));
    wv_assert_eq!(t, maps.create(&win, MapType::Array, 16, 32, 4), Ok(1));
    wv_assert_eq!(t, maps.state(), AllocState::Full);
    wv_assert_eq!(t, maps.next_ptr(), 768);

    // with the legacy write path, both descriptors end up in the first slot
    if !cfg!(feature = "legacy-map-desc") {
        let slot0 = wv_assert_ok!(maps.desc(&win, 0));
        wv_assert!(t, slot0.is_valid());
        wv_assert_eq!(t, slot0.max_entries(), 10);

        let slot1 = wv_assert_ok!(maps.desc(&win, 1));
        wv_assert_eq!(t, slot1.base(), 640);
        wv_assert_eq!(t, win.read32(cfg::MAP_BASE + cfg::MAP_DESC_SIZE), slot1.value());
        wv_assert_eq!(t, maps.lookup(&win, 1, 3), Ok(640 + 12));

        let addr = wv_assert_ok!(maps.lookup(&win, 0, 9));
        wv_assert_eq!(t, addr, 72);
        win.write64(addr, 0x1122_3344);
        wv_assert_eq!(t, win.read64(addr), 0x1122_3344);
    }

    wv_assert_ok!(maps.delete(&win, 0));
    wv_assert_eq!(t, maps.state(), AllocState::HalfBot);
    wv_assert!(t, !wv_assert_ok!(maps.desc(&win, 0)).is_valid());
}
