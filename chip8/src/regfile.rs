use std::ops::{Index, IndexMut};
use std::fmt;
use instruction::Reg;

pub struct RegFile {
    gpr: [u8; 16],
}

impl RegFile {
    pub fn new() -> RegFile {
        RegFile { gpr: [0; 16] }
    }

    /// `V0..=Vx`, for block transfers to and from memory.
    pub fn up_to(&self, vx: Reg) -> &[u8] {
        &self.gpr[..=vx.index() as usize]
    }

    pub fn up_to_mut(&mut self, vx: Reg) -> &mut [u8] {
        &mut self.gpr[..=vx.index() as usize]
    }
}

impl Index<Reg> for RegFile {
    type Output = u8;

    fn index(&self, index: Reg) -> &u8 {
        &self.gpr[index.index() as usize]
    }
}

impl IndexMut<Reg> for RegFile {
    fn index_mut(&mut self, index: Reg) -> &mut u8 {
        &mut self.gpr[index.index() as usize]
    }
}

impl fmt::Debug for RegFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut dbg = f.debug_struct("RegFile");
        for (i, value) in self.gpr.iter().enumerate() {
            let reg_name = format!("V{:0X}", i);
            let reg_value = format!("{:02x}", value);
            dbg.field(&reg_name, &reg_value);
        }
        dbg.finish()
    }
}
