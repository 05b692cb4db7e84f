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

//! Host-side driver for the FPGA-hosted eBPF core.
//!
//! The core is reachable only through a fixed memory-mapped register window (see [`cfg`]). This
//! crate covers the raw register access ([`arch`]), the control-register protocol ([`ctrl`]),
//! program loading and execution control ([`exec::Core`]), and the allocator for the two
//! array maps that loaded programs can use ([`maps`]).

#![cfg_attr(not(feature = "std"), no_std)]

#[doc(hidden)]
pub use log as _log;

#[macro_use]
pub mod io;

pub mod arch;
pub mod cfg;
pub mod ctrl;
pub mod errors;
pub mod exec;
pub mod maps;


pub use crate::arch::{Bus, MmioWindow};
pub use crate::exec::{Core, EndCause, Instr};
pub use crate::ctrl::{CoreState, CtrlFlags, CtrlReg};
pub use crate::errors::{Code, Error};
pub use crate::maps::{AllocState, MapAllocator, MapDesc, MapId, MapType, SizeCode};
