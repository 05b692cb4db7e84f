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

//! The layout of the core's register window
//!
//! All values are byte offsets from the peripheral base address. The partitions are fixed by the
//! hardware design and must not overlap.

use static_assertions::const_assert;

/// The base address of the peripheral on the reference board (Xilinx AXI slot 0)
pub const DEF_BASE_ADDR: usize = 0x43C0_0000;

/// Instruction memory
pub const INSTR_MEM_BASE: usize = 0x0000;
pub const INSTR_MEM_SIZE: usize = 0x8000;
/// The size of one instruction word
pub const INSTR_SIZE: usize = 8;
/// The maximum number of instructions that fit into instruction memory
pub const MAX_INSTRS: usize = INSTR_MEM_SIZE / INSTR_SIZE;

/// Packet buffer
pub const PACKET_BASE: usize = 0x8000;
pub const PACKET_SIZE: usize = 0x800;

/// Stack of the loaded program
pub const STACK_BASE: usize = 0x8800;
pub const STACK_SIZE: usize = 0x200;

/// The initial frame pointer, i.e., the top of the stack
pub const FRAME_POINTER: u64 = 0x89F8;
/// The general-purpose register that receives [`FRAME_POINTER`] before execution starts
pub const FRAME_POINTER_REG: u8 = 10;

/// Control/status register
pub const CORE_CTRL: usize = 0x8A00;
/// Input register, latched into a general-purpose register on register writes
pub const CORE_INPUT: usize = 0x8A08;
/// Output register (result on finish, program counter on exception)
pub const CORE_OUTPUT: usize = 0x8A10;

/// The maximum number of maps the hardware supports
pub const MAX_MAPS: usize = 2;
/// The size of a map descriptor
pub const MAP_DESC_SIZE: usize = 4;
/// Map descriptor table
pub const MAP_BASE: usize = 0x8A18;

/// Flush buffer inside the shared region
pub const SHARED_FLUSH_BUFFER: usize = 0x8FFF;

/// Shared region, hosting map storage
pub const SHARED_BASE: usize = 0x9000;
/// The capacity of the map storage in bytes
pub const MAP_MAX_SIZE: usize = 3584 * 8;

/// The size of the whole register window
pub const WINDOW_SIZE: usize = 0x10000;

const_assert!(INSTR_MEM_BASE + INSTR_MEM_SIZE <= PACKET_BASE);
const_assert!(PACKET_BASE + PACKET_SIZE <= STACK_BASE);
const_assert!(STACK_BASE + STACK_SIZE <= CORE_CTRL);
const_assert!((FRAME_POINTER as usize) < STACK_BASE + STACK_SIZE);
const_assert!(CORE_CTRL + 8 <= CORE_INPUT);
const_assert!(CORE_INPUT + 8 <= CORE_OUTPUT);
const_assert!(CORE_OUTPUT + 8 <= MAP_BASE);
const_assert!(MAP_BASE + MAX_MAPS * MAP_DESC_SIZE <= SHARED_FLUSH_BUFFER);
const_assert!(SHARED_FLUSH_BUFFER < SHARED_BASE);
const_assert!(SHARED_BASE + MAP_MAX_SIZE <= WINDOW_SIZE);
// the descriptor stores the map base in units of 8 bytes within 12 bits
const_assert!(MAP_MAX_SIZE / 8 < 1 << 12);
