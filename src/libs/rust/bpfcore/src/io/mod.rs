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

//! Contains the log flags, the `log` macro and the logger setup

pub mod log;
mod logflags;

pub use self::logflags::LogFlags;

/// Macro for logging
///
/// The arguments are forwarded to the `log` crate if $flag is enabled (see
/// [`LogFlags`](crate::io::LogFlags) and [`log::set_flags`](crate::io::log::set_flags)).
///
/// # Examples
///
/// ```
/// use bpfcore::io::LogFlags;
/// bpfcore::log!(LogFlags::Maps, "my log entry: {}, {}", 1, "test");
/// ```
#[macro_export]
macro_rules! log {
    (@log_impl $flag:expr, $($args:tt)*)    => ({
        let flag = $flag;
        if $crate::io::log::flags().intersects(flag) {
            $crate::_log::log!(target: "bpfcore", $crate::io::log::level(flag), $($args)*);
        }
    });

    ($flag:expr, $fmt:expr)                   => (
        $crate::log!(@log_impl $flag, $fmt)
    );

    ($flag:expr, $fmt:expr, $($arg:tt)*)      => (
        $crate::log!(@log_impl $flag, $fmt, $($arg)*)
    );
}
