use std::fmt;

use ErrorKind;

/// Number of nested calls the stack can hold.
pub const STACK_DEPTH: usize = 16;

/// Call stack holding the addresses of pending `CALL` instructions.
pub struct Stack {
    sp: usize,
    frames: [u16; STACK_DEPTH],
}

impl Stack {
    pub fn new() -> Stack {
        Stack {
            sp: 0,
            frames: [0; STACK_DEPTH],
        }
    }

    pub fn pop(&mut self) -> ::Result<u16> {
        if self.sp == 0 {
            bail!(ErrorKind::StackUnderflow);
        }

        self.sp -= 1;
        Ok(self.frames[self.sp])
    }

    pub fn push(&mut self, value: u16) -> ::Result<()> {
        if self.sp == STACK_DEPTH {
            bail!(ErrorKind::StackOverflow);
        }

        self.frames[self.sp] = value;
        self.sp += 1;
        Ok(())
    }

    /// Number of frames currently held.
    pub fn sp(&self) -> usize {
        self.sp
    }

    /// Held frames, oldest first.
    pub fn frames(&self) -> &[u16] {
        &self.frames[..self.sp]
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Stack {{")?;
        writeln!(f, "[")?;
        for (i, frame) in self.frames().iter().enumerate() {
            writeln!(f, "    {:01x}: {:04x}", i, frame)?;
        }
        writeln!(f, "]")?;
        writeln!(f, "  SP: {:04x} ({})", self.sp, self.sp)?;
        writeln!(f, "}}")?;

        Ok(())
    }
}
