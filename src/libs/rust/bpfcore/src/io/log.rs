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

//! Contains the runtime log configuration and the logger

use core::sync::atomic::{AtomicU32, Ordering};

use crate::io::LogFlags;

const DEF_FLAGS: LogFlags = LogFlags::Info.union(LogFlags::Error);

static FLAGS: AtomicU32 = AtomicU32::new(DEF_FLAGS.bits());

/// Returns the currently enabled log flags
pub fn flags() -> LogFlags {
    LogFlags::from_bits_truncate(FLAGS.load(Ordering::Relaxed))
}

/// Sets the enabled log flags to `flags`
pub fn set_flags(flags: LogFlags) {
    FLAGS.store(flags.bits(), Ordering::Relaxed);
}

/// Returns the log level that is used for messages logged with `flag`
pub fn level(flag: LogFlags) -> log::Level {
    if flag.contains(LogFlags::Error) {
        log::Level::Error
    }
    else if flag.contains(LogFlags::Info) {
        log::Level::Info
    }
    else {
        log::Level::Debug
    }
}

#[cfg(feature = "std")]
mod stderr {
    use log::{Log, Metadata, Record};

    pub struct Logger;

    impl Log for Logger {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            // filtering happens via the log flags
            true
        }

        fn log(&self, record: &Record<'_>) {
            let target = if !record.target().is_empty() {
                record.target()
            }
            else {
                record.module_path().unwrap_or_default()
            };

            std::eprintln!("{:<5} [{}] {}", record.level(), target, record.args());
        }

        fn flush(&self) {
        }
    }
}

/// Initializes logging
///
/// Reads the log flags from the environment variable `BPF_LOG`, if present, and installs a logger
/// that writes to stderr.
///
/// # Errors
///
/// Returns [`InvArgs`](crate::errors::Code::InvArgs) if `BPF_LOG` cannot be parsed and
/// [`Exists`](crate::errors::Code::Exists) if another logger has already been installed.
#[cfg(feature = "std")]
pub fn init() -> Result<(), crate::errors::Error> {
    use crate::errors::{Code, Error};

    if let Ok(val) = std::env::var("BPF_LOG") {
        set_flags(val.parse().map_err(|_| Error::new(Code::InvArgs))?);
    }

    log::set_boxed_logger(std::boxed::Box::new(stderr::Logger))
        .map_err(|_| Error::new(Code::Exists))?;
    log::set_max_level(log::LevelFilter::Debug);
    Ok(())
}
