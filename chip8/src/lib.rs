// `error_chain!` can recurse deeply
#![recursion_limit = "1024"]

extern crate rand;
extern crate byteorder;
#[macro_use]
extern crate enum_primitive;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

mod stack;
mod timer;
mod vm;
mod regfile;

pub mod display;
pub mod instruction;
pub mod keypad;
pub mod memory;

pub use self::vm::Chip8;
pub use self::instruction::{Instruction, InstructionWord, Reg};

error_chain! {
    errors {
        RomTooLarge(len: usize) {
            description("rom does not fit into program memory")
            display("rom is {} bytes long, only {} bytes fit into program memory",
                    len, memory::MAX_PROGRAM_SIZE)
        }
        AddressOutOfRange(addr: usize) {
            description("memory access out of range")
            display("memory access at {:#06x} is out of range", addr)
        }
        StackOverflow {
            description("call stack overflow")
            display("call stack overflow: more than {} nested calls", stack::STACK_DEPTH)
        }
        StackUnderflow {
            description("call stack underflow")
            display("return with an empty call stack")
        }
    }
}
