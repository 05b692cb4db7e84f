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

//! Contains the error handling types

use core::fmt;

/// The error codes
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Code {
    // core errors
    NotIdle,
    Terminated,
    Sleeping,
    // map errors
    NotSup,
    NoSpace,
    NoFreeSlot,
    InvState,
    NotFound,
    // generic errors
    InvArgs,
    OutOfBounds,
    Exists,
}

/// The error struct that is passed around
#[derive(Clone, Copy)]
pub struct Error {
    code: Code,
}

impl Error {
    /// Creates a new object for given error code
    pub const fn new(code: Code) -> Self {
        Error { code }
    }

    /// Returns the error code
    pub fn code(&self) -> Code {
        self.code
    }

    fn debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.code())
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        self.code() == other.code()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.debug(f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.debug(f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
}
