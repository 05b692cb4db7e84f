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

use core::str;

use bitflags::bitflags;

bitflags! {
    /// All log flags used in bpfcore
    ///
    /// Logging is controlled at runtime via [`set_flags`](crate::io::log::set_flags) or, if the
    /// logger is set up via [`init`](crate::io::log::init), via the environment variable
    /// `BPF_LOG` (e.g., `BPF_LOG="Info|Maps"`).
    ///
    /// There are three general flags: `Info`, `Debug`, and `Error`. Info and Error are enabled by
    /// default. The remaining flags control the logging of individual parts of the driver.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct LogFlags : u32 {
        /// General: informational output (enabled by default)
        const Info          = 1 << 0;
        /// General: debugging output (disable by default)
        const Debug         = 1 << 1;
        /// General: error output (enabled by default)
        const Error         = 1 << 2;

        #[doc(hidden)]
        const __core_start = 3;

        /// Core: control register reads/writes
        const CoreCtrl      = 1 << (Self::__core_start.bits() + 0);
        /// Core: program loading
        const CoreLoad      = 1 << (Self::__core_start.bits() + 1);
        /// Core: start/sleep/awake/await
        const CoreExec      = 1 << (Self::__core_start.bits() + 2);

        #[doc(hidden)]
        const __maps_start = Self::__core_start.bits() + 3;

        /// Maps: allocations/frees and allocator state changes
        const Maps          = 1 << (Self::__maps_start.bits() + 0);
        /// Maps: element lookups
        const MapLookups    = 1 << (Self::__maps_start.bits() + 1);
    }
}

impl str::FromStr for LogFlags {
    type Err = bitflags::parser::ParseError;

    fn from_str(flags: &str) -> Result<Self, Self::Err> {
        Ok(Self(flags.parse()?))
    }
}
