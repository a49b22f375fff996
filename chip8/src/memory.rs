//! 4K of byte-addressable memory.
//!
//! ```text
//! 0x000 +---------------------------+
//!       | font glyphs (16 x 5 bytes)|
//! 0x050 +---------------------------+
//!       | reserved                  |
//! 0x200 +---------------------------+
//!       | program                   |
//! 0x1000+---------------------------+
//! ```
//!
//! Every accessor is bounds checked and reports `AddressOutOfRange` instead of
//! wrapping or panicking.

use std::cmp;
use std::fmt;
use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};

use ErrorKind;

pub const MEMORY_SIZE: usize = 0x1000;

/// Address programs are loaded at and start executing from.
pub const PROGRAM_START: u16 = 0x200;

/// Largest program that fits between `PROGRAM_START` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

pub const FONT_MEMORY_OFFSET: u16 = 0;

/// Size in bytes of a single font glyph.
pub const GLYPH_SIZE: u16 = 5;

#[cfg_attr(rustfmt, rustfmt_skip)]
const FONT_SPRITES: [u8; 80] = [
	0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
	0x20, 0x60, 0x20, 0x20, 0x70, // 1
	0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
	0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
	0x90, 0x90, 0xF0, 0x10, 0x10, // 4
	0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
	0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
	0xF0, 0x10, 0x20, 0x40, 0x40, // 7
	0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
	0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
	0xF0, 0x90, 0xF0, 0x90, 0x90, // A
	0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
	0xF0, 0x80, 0x80, 0x80, 0xF0, // C
	0xE0, 0x90, 0x90, 0x90, 0xE0, // D
	0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
	0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    /// Zeroed memory with the font glyphs in place.
    pub fn new() -> Memory {
        let mut memory = Memory {
            bytes: [0; MEMORY_SIZE],
        };
        memory.reset();
        memory
    }

    pub fn reset(&mut self) {
        self.bytes = [0; MEMORY_SIZE];

        let font_start = FONT_MEMORY_OFFSET as usize;
        let font_memory = &mut self.bytes[font_start..font_start + FONT_SPRITES.len()];
        font_memory.copy_from_slice(&FONT_SPRITES);
    }

    /// Copies `program` to `PROGRAM_START`. Nothing is written if it doesn't fit.
    pub fn load_program(&mut self, program: &[u8]) -> ::Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            bail!(ErrorKind::RomTooLarge(program.len()));
        }

        self.slice_mut(PROGRAM_START, program.len())?
            .copy_from_slice(program);
        Ok(())
    }

    pub fn read_byte(&self, addr: u16) -> ::Result<u8> {
        Ok(self.slice(addr, 1)?[0])
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) -> ::Result<()> {
        self.slice_mut(addr, 1)?[0] = value;
        Ok(())
    }

    /// Big-endian word at `addr` and `addr + 1`.
    pub fn read_word(&self, addr: u16) -> ::Result<u16> {
        Ok(BigEndian::read_u16(self.slice(addr, 2)?))
    }

    pub fn slice(&self, addr: u16, len: usize) -> ::Result<&[u8]> {
        let range = checked_range(addr, len)?;
        Ok(&self.bytes[range])
    }

    pub fn slice_mut(&mut self, addr: u16, len: usize) -> ::Result<&mut [u8]> {
        let range = checked_range(addr, len)?;
        Ok(&mut self.bytes[range])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

/// Address of the font glyph for the hex digit `digit`.
pub fn glyph_addr(digit: u8) -> u16 {
    FONT_MEMORY_OFFSET + digit as u16 * GLYPH_SIZE
}

fn checked_range(addr: u16, len: usize) -> ::Result<Range<usize>> {
    let start = addr as usize;
    let end = start + len;
    if end > MEMORY_SIZE {
        // Report the first address that falls outside of memory.
        bail!(ErrorKind::AddressOutOfRange(cmp::max(start, MEMORY_SIZE)));
    }
    Ok(start..end)
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Memory({} bytes)", self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_is_loaded_at_zero() {
        let memory = Memory::new();
        assert_eq!(&memory.as_slice()[0..5], &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(&memory.as_slice()[75..80], &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
        assert!(memory.as_slice()[80..].iter().all(|&b| b == 0));
    }

    #[test]
    fn glyph_addresses() {
        assert_eq!(glyph_addr(0x0), 0x00);
        assert_eq!(glyph_addr(0xA), 0x32);
        assert_eq!(glyph_addr(0xF), 0x4B);
    }

    #[test]
    fn reads_words_big_endian() {
        let mut memory = Memory::new();
        memory.write_byte(0x200, 0xAA).unwrap();
        memory.write_byte(0x201, 0xBB).unwrap();
        assert_eq!(memory.read_word(0x200).unwrap(), 0xAABB);
    }

    #[test]
    fn last_word_is_readable() {
        let memory = Memory::new();
        assert_eq!(memory.read_word(0xFFE).unwrap(), 0);
    }

    #[test]
    fn word_past_the_end_is_out_of_range() {
        let memory = Memory::new();
        match *memory.read_word(0xFFF).unwrap_err().kind() {
            ErrorKind::AddressOutOfRange(addr) => assert_eq!(addr, 0x1000),
            ref other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn access_far_out_of_range() {
        let mut memory = Memory::new();
        match *memory.write_byte(0x1234, 1).unwrap_err().kind() {
            ErrorKind::AddressOutOfRange(addr) => assert_eq!(addr, 0x1234),
            ref other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn load_program_fills_exactly_to_the_end() {
        let mut memory = Memory::new();
        let program = vec![0x42; MAX_PROGRAM_SIZE];
        memory.load_program(&program).unwrap();
        assert_eq!(memory.as_slice()[0x1FF], 0);
        assert_eq!(memory.as_slice()[0x200], 0x42);
        assert_eq!(memory.as_slice()[0xFFF], 0x42);
    }

    #[test]
    fn oversized_program_is_rejected_untouched() {
        let mut memory = Memory::new();
        let program = vec![0x42; MAX_PROGRAM_SIZE + 1];
        match *memory.load_program(&program).unwrap_err().kind() {
            ErrorKind::RomTooLarge(len) => assert_eq!(len, 3585),
            ref other => panic!("unexpected error: {:?}", other),
        }
        assert!(memory.as_slice()[0x200..].iter().all(|&b| b == 0));
    }
}
