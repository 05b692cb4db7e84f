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

//! The allocator and accessor for the maps of loaded programs
//!
//! The core supports up to two array maps ([`cfg::MAX_MAPS`]), described by the map descriptor
//! table and backed by the map storage in the shared region. The allocator hands out the storage
//! from bottom to top and tracks which of the two slots is in use. Slot 0 always lives below slot 1
//! unless slot 0 has been freed and allocated again while slot 1 was in use.

use core::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive, TryFromPrimitiveError};

use crate::arch::Bus;
use crate::cfg;
use crate::errors::{Code, Error};
use crate::io::LogFlags;

/// A map id, i.e., the slot in the map descriptor table
pub type MapId = usize;

/// The underlying type of [`MapDesc`]
pub type MapDescRaw = u32;

/// The maximum number of entries per map
pub const MAX_ENTRIES: u32 = (1 << 15) - 1;

/// The supported map types
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum MapType {
    /// A flat array indexed by the key
    Array,
}

impl From<TryFromPrimitiveError<MapType>> for Error {
    fn from(_: TryFromPrimitiveError<MapType>) -> Self {
        Self::new(Code::NotSup)
    }
}

/// The 2-bit encoding of a key or value width
#[derive(Copy, Clone, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum SizeCode {
    B8,
    B16,
    B32,
    B64,
}

impl SizeCode {
    /// Returns the code for a width of `bits` bits, if supported
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Self::B8),
            16 => Some(Self::B16),
            32 => Some(Self::B32),
            64 => Some(Self::B64),
            _ => None,
        }
    }

    /// Returns the width in bits
    pub fn bits(self) -> u32 {
        8 << self as u32
    }

    /// Returns the width in bytes
    pub fn bytes(self) -> usize {
        1 << self as u32
    }

    /// Returns the mask that reduces a key to this width
    pub fn mask(self) -> u64 {
        match self {
            Self::B64 => u64::MAX,
            _ => (1 << self.bits()) - 1,
        }
    }
}

/// A map descriptor as stored in the map descriptor table.
///
/// Layout (LSB first): base pointer in units of 8 bytes (12 bits), key size code (2 bits), value
/// size code (2 bits), max entries (15 bits), valid (1 bit).
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct MapDesc {
    val: MapDescRaw,
}

impl MapDesc {
    /// Creates a new descriptor from the given values
    pub const fn new(
        base_ptr: u32,
        key_size: SizeCode,
        val_size: SizeCode,
        max_entries: u32,
        valid: bool,
    ) -> Self {
        let val = (base_ptr & 0xFFF)
            | (key_size as MapDescRaw) << 12
            | (val_size as MapDescRaw) << 14
            | (max_entries & MAX_ENTRIES) << 16
            | (valid as MapDescRaw) << 31;
        Self::new_from(val)
    }

    /// Creates a new descriptor from the given raw value
    pub const fn new_from(val: MapDescRaw) -> Self {
        Self { val }
    }

    /// Returns the raw value
    pub fn value(self) -> MapDescRaw {
        self.val
    }

    /// Returns the base pointer in units of 8 bytes
    pub fn base_ptr(self) -> u32 {
        self.val & 0xFFF
    }

    /// Returns the base pointer in bytes
    pub fn base(self) -> usize {
        self.base_ptr() as usize * 8
    }

    pub fn key_size(self) -> SizeCode {
        Self::size_code(self.val >> 12)
    }

    pub fn val_size(self) -> SizeCode {
        Self::size_code(self.val >> 14)
    }

    pub fn max_entries(self) -> u32 {
        (self.val >> 16) & MAX_ENTRIES
    }

    pub fn is_valid(self) -> bool {
        (self.val >> 31) != 0
    }

    /// Returns a copy of this descriptor with the valid bit set to `valid`
    pub fn with_valid(self, valid: bool) -> Self {
        Self::new_from((self.val & !(1 << 31)) | (valid as MapDescRaw) << 31)
    }

    fn size_code(bits: MapDescRaw) -> SizeCode {
        match bits & 0x3 {
            0 => SizeCode::B8,
            1 => SizeCode::B16,
            2 => SizeCode::B32,
            _ => SizeCode::B64,
        }
    }
}

impl fmt::Debug for MapDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MapDesc[base={:#x}, key={}, val={}, entries={}, valid={}]",
            self.base(),
            self.key_size().bits(),
            self.val_size().bits(),
            self.max_entries(),
            self.is_valid()
        )
    }
}

/// The occupation of the two map slots
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AllocState {
    /// No map is allocated
    Empty,
    /// Only slot 0 is in use
    HalfTop,
    /// Only slot 1 is in use
    HalfBot,
    /// No slot is available
    Full,
}

/// The allocator state for the maps of one core.
///
/// The driver has to be the only writer of the map descriptor table, and there must be exactly one
/// allocator per core. The allocator is not synchronized; concurrent users need to serialize all
/// calls themselves.
#[derive(Debug)]
pub struct MapAllocator {
    state: AllocState,
    next_ptr: usize,
}

impl Default for MapAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl MapAllocator {
    /// Creates a new allocator for a core with an empty map descriptor table
    pub const fn new() -> Self {
        Self {
            state: AllocState::Empty,
            next_ptr: 0,
        }
    }

    /// Returns the current state
    pub fn state(&self) -> AllocState {
        self.state
    }

    /// Returns the offset of the next free byte in the map storage
    pub fn next_ptr(&self) -> usize {
        self.next_ptr
    }

    /// Reads the descriptor of the map with given id
    pub fn desc<B: Bus>(&self, bus: &B, id: MapId) -> Result<MapDesc, Error> {
        if id >= cfg::MAX_MAPS {
            return Err(Error::new(Code::InvArgs));
        }
        Ok(read_desc(bus, id))
    }

    /// Creates a new map with `max_entries` entries and keys/values of the given widths in bits.
    ///
    /// The map occupies `(val_size * max_entries / 8) * 8` bytes of the map storage, the
    /// cursor advancing in multiples of 8.
    ///
    /// # Errors
    ///
    /// - [`InvArgs`](Code::InvArgs) if a width is not one of 8, 16, 32, 64 or `max_entries`
    ///   exceeds [`MAX_ENTRIES`]
    /// - [`NoSpace`](Code::NoSpace) if the map storage cannot hold the map
    /// - [`NoFreeSlot`](Code::NoFreeSlot) if both slots are in use
    pub fn create<B: Bus>(
        &mut self,
        bus: &B,
        ty: MapType,
        key_size: u32,
        val_size: u32,
        max_entries: u32,
    ) -> Result<MapId, Error> {
        match ty {
            MapType::Array => {},
        }

        let key_code = SizeCode::from_bits(key_size).ok_or_else(|| Error::new(Code::InvArgs))?;
        let val_code = SizeCode::from_bits(val_size).ok_or_else(|| Error::new(Code::InvArgs))?;
        if max_entries > MAX_ENTRIES {
            return Err(Error::new(Code::InvArgs));
        }

        let size = (val_size as usize * max_entries as usize / 8) * 8;
        let next = self.next_ptr + size;
        if next > cfg::MAP_MAX_SIZE {
            log!(
                LogFlags::Maps,
                "maps: cannot allocate {} bytes at {:#x}",
                size,
                self.next_ptr
            );
            return Err(Error::new(Code::NoSpace));
        }

        let (id, state) = match self.state {
            AllocState::Empty if next == cfg::MAP_MAX_SIZE => (0, AllocState::Full),
            AllocState::Empty => (0, AllocState::HalfTop),
            AllocState::HalfTop => (1, AllocState::Full),
            AllocState::HalfBot => (0, AllocState::Full),
            AllocState::Full => return Err(Error::new(Code::NoFreeSlot)),
        };

        let desc = MapDesc::new(
            (self.next_ptr / 8) as u32,
            key_code,
            val_code,
            max_entries,
            true,
        );
        write_desc(bus, id, desc);

        log!(
            LogFlags::Maps,
            "maps: created map {} {:?}; {:?} -> {:?}, next={:#x}",
            id,
            desc,
            self.state,
            state,
            next
        );
        self.next_ptr = next;
        self.state = state;
        Ok(id)
    }

    /// Deletes the map with given id.
    ///
    /// # Errors
    ///
    /// - [`InvArgs`](Code::InvArgs) if `id` is not a valid slot
    /// - [`InvState`](Code::InvState) if no map is allocated in slot `id`
    pub fn delete<B: Bus>(&mut self, bus: &B, id: MapId) -> Result<(), Error> {
        if id >= cfg::MAX_MAPS {
            return Err(Error::new(Code::InvArgs));
        }

        let desc = read_desc(bus, id);
        let (next, state) = match (self.state, id) {
            (AllocState::HalfTop, 0) | (AllocState::HalfBot, 1) => (0, AllocState::Empty),
            (AllocState::Full, 1) => (desc.base(), AllocState::HalfTop),
            (AllocState::Full, _) => {
                // slot 1 stays where it is, but the next allocation starts at 0 again and may
                // overlap with it.
                log!(
                    LogFlags::Info,
                    "maps: freeing slot 0 while slot 1 is in use resets the storage pointer"
                );
                (0, AllocState::HalfBot)
            },
            _ => return Err(Error::new(Code::InvState)),
        };

        write_desc(bus, id, desc.with_valid(false));

        log!(
            LogFlags::Maps,
            "maps: deleted map {}; {:?} -> {:?}, next={:#x}",
            id,
            self.state,
            state,
            next
        );
        self.next_ptr = next;
        self.state = state;
        Ok(())
    }

    /// Returns the offset in the register window of the element with given key.
    ///
    /// The key is reduced to the key width of the map. The element has the value width of the map
    /// and is accessed by the caller via the [`Bus`]; this function does not access the element.
    ///
    /// # Errors
    ///
    /// - [`InvArgs`](Code::InvArgs) if `id` is not a valid slot
    /// - [`NotFound`](Code::NotFound) if no map is allocated in slot `id`
    /// - [`OutOfBounds`](Code::OutOfBounds) if the reduced key is not below the number of entries
    pub fn lookup<B: Bus>(&self, bus: &B, id: MapId, key: u64) -> Result<usize, Error> {
        if id >= cfg::MAX_MAPS {
            return Err(Error::new(Code::InvArgs));
        }

        let desc = read_desc(bus, id);
        if !desc.is_valid() {
            return Err(Error::new(Code::NotFound));
        }

        let key = key & desc.key_size().mask();
        if key >= desc.max_entries() as u64 {
            return Err(Error::new(Code::OutOfBounds));
        }

        let addr = desc.base() + ((key as usize) << desc.val_size() as u32);
        log!(
            LogFlags::MapLookups,
            "maps: map {} key {} -> {:#x}",
            id,
            key,
            addr
        );
        Ok(addr)
    }
}

fn read_desc<B: Bus>(bus: &B, id: MapId) -> MapDesc {
    MapDesc::new_from(bus.read32(cfg::MAP_BASE + cfg::MAP_DESC_SIZE * id))
}

#[cfg(not(feature = "legacy-map-desc"))]
fn write_desc<B: Bus>(bus: &B, id: MapId, desc: MapDesc) {
    bus.write32(cfg::MAP_BASE + cfg::MAP_DESC_SIZE * id, desc.value());
}

// compatibility mode: the slot offset ends up in the value instead of the address
#[cfg(feature = "legacy-map-desc")]
fn write_desc<B: Bus>(bus: &B, id: MapId, desc: MapDesc) {
    bus.write32(
        cfg::MAP_BASE,
        desc.value().wrapping_add((cfg::MAP_DESC_SIZE * id) as MapDescRaw),
    );
}
