//! Linear memory for translated WASM modules.
//!
//! One [`Memory`] is the sole addressable store behind every pointer the
//! translated module manipulates. It mirrors WASM linear-memory semantics:
//! sized in whole 64 KiB pages, growable but never shrinking, with typed
//! little-endian loads and stores at byte addresses.
//!
//! Addresses come from verified bytecode, so this layer does no bounds
//! checking of its own; a bad address aborts via the slice-indexing checks
//! instead of corrupting memory. Variable-length data crosses the boundary
//! through 16-byte descriptors: an `i64` pointer followed by an `i64` length.
//!
//! Borrowed views ([`Memory::load_slice`] and friends) tie themselves to the
//! `Memory` borrow, so a [`Memory::grow`] — which may reallocate — cannot be
//! interleaved with a live view. That invariant is load-bearing: the
//! original runtime kept raw pointers into the buffer and required callers
//! to drop them across growth.

use gonative_trap::{trap, Violation};

/// Size of one linear-memory page in bytes.
pub const PAGE_SIZE: usize = 64 * 1024;

/// Hard ceiling on the memory size: the full wasm32 address space.
const MAX_MEMORY_SIZE: usize = 4 * 1024 * 1024 * 1024;

/// Reserving the full 4 GiB up front can fail on constrained targets;
/// 1 GiB is safe in most environments.
const INITIAL_RESERVATION: usize = 1024 * 1024 * 1024;

/// A compile-time data segment copied into memory at instantiation.
#[derive(Debug, Clone, Copy)]
pub struct DataSegment<'a> {
    /// Byte offset the segment is copied to.
    pub offset: u32,
    /// Segment contents, typically a `static` emitted by the translator.
    pub bytes: &'a [u8],
}

/// The growable linear byte buffer of one module instance.
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Create a memory of `initial_pages` pages with the given data segments
    /// already in place.
    pub fn new(initial_pages: u32, segments: &[DataSegment<'_>]) -> Memory {
        let mut bytes = Vec::with_capacity(INITIAL_RESERVATION);
        bytes.resize(initial_pages as usize * PAGE_SIZE, 0);
        let mut mem = Memory { bytes };
        for segment in segments {
            mem.store_bytes(segment.offset, segment.bytes);
        }
        mem
    }

    /// Current size in pages.
    pub fn size(&self) -> u32 {
        (self.bytes.len() / PAGE_SIZE) as u32
    }

    /// Grow by `delta_pages` pages, returning the page count before growth.
    ///
    /// Capacity is doubled until the new size fits, capped at 4 GiB; a
    /// request past the ceiling is a contract violation and traps. Newly
    /// added bytes are not contractually zero-filled — callers must not
    /// assume their contents.
    pub fn grow(&mut self, delta_pages: u32) -> u32 {
        let prev_pages = self.size();
        let new_size = (prev_pages as usize + delta_pages as usize) * PAGE_SIZE;
        if new_size > MAX_MEMORY_SIZE {
            trap(Violation::MemoryExhausted(format!(
                "cannot grow linear memory to {new_size} bytes: the limit is {MAX_MEMORY_SIZE}"
            )));
        }
        if self.bytes.capacity() < new_size {
            let mut new_capacity = self.bytes.capacity().max(PAGE_SIZE);
            while new_capacity < new_size {
                new_capacity *= 2;
            }
            let new_capacity = new_capacity.min(MAX_MEMORY_SIZE);
            self.bytes.reserve_exact(new_capacity - self.bytes.len());
        }
        self.bytes.resize(new_size, 0);
        prev_pages
    }

    fn load_array<const N: usize>(&self, addr: u32) -> [u8; N] {
        let addr = addr as usize;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[addr..addr + N]);
        out
    }

    pub fn load_i8(&self, addr: u32) -> i8 {
        self.bytes[addr as usize] as i8
    }

    pub fn load_u8(&self, addr: u32) -> u8 {
        self.bytes[addr as usize]
    }

    pub fn load_i16(&self, addr: u32) -> i16 {
        i16::from_le_bytes(self.load_array(addr))
    }

    pub fn load_u16(&self, addr: u32) -> u16 {
        u16::from_le_bytes(self.load_array(addr))
    }

    pub fn load_i32(&self, addr: u32) -> i32 {
        i32::from_le_bytes(self.load_array(addr))
    }

    pub fn load_u32(&self, addr: u32) -> u32 {
        u32::from_le_bytes(self.load_array(addr))
    }

    pub fn load_i64(&self, addr: u32) -> i64 {
        i64::from_le_bytes(self.load_array(addr))
    }

    pub fn load_u64(&self, addr: u32) -> u64 {
        u64::from_le_bytes(self.load_array(addr))
    }

    pub fn load_f32(&self, addr: u32) -> f32 {
        f32::from_le_bytes(self.load_array(addr))
    }

    pub fn load_f64(&self, addr: u32) -> f64 {
        f64::from_le_bytes(self.load_array(addr))
    }

    pub fn store_i8(&mut self, addr: u32, val: i8) {
        self.bytes[addr as usize] = val as u8;
    }

    pub fn store_i16(&mut self, addr: u32, val: i16) {
        self.store_bytes(addr, &val.to_le_bytes());
    }

    pub fn store_i32(&mut self, addr: u32, val: i32) {
        self.store_bytes(addr, &val.to_le_bytes());
    }

    pub fn store_i64(&mut self, addr: u32, val: i64) {
        self.store_bytes(addr, &val.to_le_bytes());
    }

    pub fn store_f32(&mut self, addr: u32, val: f32) {
        self.store_bytes(addr, &val.to_le_bytes());
    }

    pub fn store_f64(&mut self, addr: u32, val: f64) {
        self.store_bytes(addr, &val.to_le_bytes());
    }

    /// Bulk copy into `[addr, addr + bytes.len())`.
    pub fn store_bytes(&mut self, addr: u32, bytes: &[u8]) {
        let addr = addr as usize;
        self.bytes[addr..addr + bytes.len()].copy_from_slice(bytes);
    }

    /// View the slice described by the 16-byte descriptor at `addr`
    /// (`i64` pointer, then `i64` length).
    pub fn load_slice(&self, addr: u32) -> &[u8] {
        let ptr = self.load_i64(addr);
        let len = self.load_i64(addr + 8);
        self.load_slice_directly(ptr, len)
    }

    /// Mutable variant of [`Memory::load_slice`], for write-back into
    /// module-visible buffers.
    pub fn load_slice_mut(&mut self, addr: u32) -> &mut [u8] {
        let ptr = self.load_i64(addr);
        let len = self.load_i64(addr + 8);
        self.load_slice_directly_mut(ptr, len)
    }

    /// View `[ptr, ptr + len)` without reading a descriptor.
    pub fn load_slice_directly(&self, ptr: i64, len: i64) -> &[u8] {
        &self.bytes[ptr as usize..(ptr + len) as usize]
    }

    /// Mutable variant of [`Memory::load_slice_directly`].
    pub fn load_slice_directly_mut(&mut self, ptr: i64, len: i64) -> &mut [u8] {
        &mut self.bytes[ptr as usize..(ptr + len) as usize]
    }

    /// Materialize the string described by the descriptor at `addr` as an
    /// owned copy.
    pub fn load_string(&self, addr: u32) -> String {
        String::from_utf8_lossy(self.load_slice(addr)).into_owned()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("pages", &self.size())
            .field("capacity", &self.bytes.capacity())
            .finish()
    }
}
