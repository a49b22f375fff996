use std::fmt;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use stack::Stack;
use timer::Timer;
use display::Display;
use keypad::{Keypad, KEY_COUNT};
use memory::{self, Memory, PROGRAM_START};
use instruction::*;
use regfile::RegFile;

/// Width of an instruction in bytes.
const INSTRUCTION_SIZE: u16 = 2;

pub struct Chip8 {
    memory: Memory,
    gpr: RegFile,
    stack: Stack,
    pc: u16,
    i: u16,
    dt: Timer,
    st: Timer,
    display: Display,
    keypad: Keypad,
    redraw: bool,
    tone: bool,
    rng: StdRng,
    cycles: u64,
    unknown_opcodes: u64,
}

impl Chip8 {
    pub fn new() -> Chip8 {
        Chip8::with_rng(StdRng::from_entropy())
    }

    /// Machine whose `RND` instruction yields a reproducible sequence.
    pub fn with_seed(seed: u64) -> Chip8 {
        Chip8::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Chip8 {
        Chip8 {
            memory: Memory::new(),
            gpr: RegFile::new(),
            stack: Stack::new(),
            pc: PROGRAM_START,
            i: 0,
            dt: Timer::new(),
            st: Timer::new(),
            display: Display::new(),
            keypad: Keypad::new(),
            redraw: false,
            tone: false,
            rng,
            cycles: 0,
            unknown_opcodes: 0,
        }
    }

    pub fn with_rom(rom_data: &[u8]) -> ::Result<Chip8> {
        let mut chip8 = Chip8::new();
        chip8.load_program(rom_data)?;
        Ok(chip8)
    }

    /// Puts the machine back into its power-on state: memory holds only the font,
    /// registers, stack, timers, screen and keys are cleared and `pc` is `0x200`.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.gpr = RegFile::new();
        self.stack = Stack::new();
        self.pc = PROGRAM_START;
        self.i = 0;
        self.dt = Timer::new();
        self.st = Timer::new();
        self.display.clear();
        self.keypad.release_all();
        self.redraw = false;
        self.tone = false;
        self.cycles = 0;
        self.unknown_opcodes = 0;
        debug!("machine reset");
    }

    /// Copies a program to `0x200`. Memory is left untouched if the program
    /// doesn't fit.
    pub fn load_program(&mut self, program: &[u8]) -> ::Result<()> {
        self.memory.load_program(program)?;
        debug!("loaded {} byte program at {:#05x}", program.len(), PROGRAM_START);
        Ok(())
    }

    /// Runs a single fetch-decode-execute step followed by the timer update.
    ///
    /// On error the failing instruction has no effect; the machine should be
    /// considered halted.
    pub fn cycle(&mut self) -> ::Result<()> {
        self.redraw = false;
        self.tone = false;

        let instruction_word = InstructionWord(self.memory.read_word(self.pc)?);
        let instruction = Instruction::decode(instruction_word);
        trace!("{:04x}: {:04x} {}", self.pc, instruction_word.0, instruction);

        let next_pc = self.execute_instruction(instruction)?;
        self.pc = next_pc;
        self.cycles += 1;

        self.update_timers();

        Ok(())
    }

    fn update_timers(&mut self) {
        self.dt.step();
        if self.st.step() {
            self.tone = true;
        }
    }

    fn execute_instruction(&mut self, instruction: Instruction) -> ::Result<u16> {
        use instruction::Instruction::*;

        let mut next_pc = self.pc + INSTRUCTION_SIZE;

        match instruction {
            ClearScreen => {
                self.display.clear();
                self.redraw = true;
            }
            Ret => {
                // Frames hold the address of the call itself.
                let call_site = self.stack.pop()?;
                next_pc = call_site + INSTRUCTION_SIZE;
            }
            Sys(addr) => {
                debug!("ignoring SYS {:#05x} at {:#05x}", addr.0, self.pc);
            }
            Jump(addr) => {
                next_pc = addr.0;
            }
            Call(addr) => {
                self.stack.push(self.pc)?;
                next_pc = addr.0;
            }
            SkipEqImm { vx, imm, inv } => {
                if (self.gpr[vx] == imm.0) != inv {
                    next_pc += INSTRUCTION_SIZE;
                }
            }
            SkipEqReg { vx, vy, inv } => {
                if (self.gpr[vx] == self.gpr[vy]) != inv {
                    next_pc += INSTRUCTION_SIZE;
                }
            }
            PutImm { vx, imm } => {
                self.gpr[vx] = imm.0;
            }
            AddImm { vx, imm } => {
                let x = self.gpr[vx];
                self.gpr[vx] = x.wrapping_add(imm.0);
            }
            Apply { vx, vy, f } => self.apply(vx, vy, f),
            SetI(addr) => {
                self.i = addr.0;
            }
            JumpPlusV0(addr) => {
                next_pc = addr.0 + self.gpr[Reg::V0] as u16;
            }
            Randomize { vx, imm } => {
                let random_byte = self.rng.gen::<u8>();
                self.gpr[vx] = random_byte & imm.0;
            }
            Draw { vx, vy, n } => {
                let x = self.gpr[vx] as usize;
                let y = self.gpr[vy] as usize;

                let collision_bit = {
                    let sprite = self.memory.slice(self.i, n.0 as usize)?;
                    self.display.draw(x, y, sprite)
                };

                self.gpr[Reg::Vf] = if collision_bit { 1 } else { 0 };
                self.redraw = true;
            }
            SkipPressed { vx, inv } => {
                if self.keypad.is_pressed(self.gpr[vx]) != inv {
                    next_pc += INSTRUCTION_SIZE;
                }
            }
            GetDT(vx) => {
                self.gpr[vx] = self.dt.get();
            }
            WaitKey(vx) => match self.keypad.first_pressed() {
                Some(key) => self.gpr[vx] = key,
                // Re-executed on the next cycle until a key shows up.
                None => next_pc = self.pc,
            },
            SetDT(vx) => {
                let x = self.gpr[vx];
                self.dt.set(x);
            }
            SetST(vx) => {
                let x = self.gpr[vx];
                self.st.set(x);
            }
            AddI(vx) => {
                let x = self.gpr[vx] as u16;
                self.i = self.i.wrapping_add(x);
            }
            LoadGlyph(vx) => {
                self.i = memory::glyph_addr(self.gpr[vx]);
            }
            StoreBCD(vx) => {
                let v = self.gpr[vx];
                let digits = self.memory.slice_mut(self.i, 3)?;
                digits[0] = v / 100;
                digits[1] = (v / 10) % 10;
                digits[2] = v % 10;
            }
            StoreRegs(vx) => {
                let regs = self.gpr.up_to(vx);
                self.memory
                    .slice_mut(self.i, regs.len())?
                    .copy_from_slice(regs);
            }
            LoadRegs(vx) => {
                let regs = self.gpr.up_to_mut(vx);
                let len = regs.len();
                regs.copy_from_slice(self.memory.slice(self.i, len)?);
            }
            Unknown(word) => {
                self.unknown_opcodes += 1;
                warn!("unknown opcode {:04x} at {:#05x}, skipping", word.0, self.pc);
            }
        }

        Ok(next_pc)
    }

    fn apply(&mut self, vx: Reg, vy: Reg, f: Fun) {
        let x = self.gpr[vx];
        let y = self.gpr[vy];

        // VF is written last so that it wins when it is also the destination.
        let (result, flag) = match f {
            Fun::Id => (y, None),
            Fun::Or => (x | y, None),
            Fun::And => (x & y, None),
            Fun::Xor => (x ^ y, None),
            Fun::Add => {
                let (v, overflow) = x.overflowing_add(y);
                (v, Some(overflow as u8))
            }
            Fun::Subtract => (x.wrapping_sub(y), Some((x > y) as u8)),
            Fun::SubtractInv => (y.wrapping_sub(x), Some((y > x) as u8)),
            Fun::ShiftRight => (x >> 1, Some(x & 0x01)),
            Fun::ShiftLeft => (x << 1, Some(x >> 7)),
        };

        self.gpr[vx] = result;
        if let Some(flag) = flag {
            self.gpr[Reg::Vf] = flag;
        }
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn set_i(&mut self, i: u16) {
        self.i = i;
    }

    /// Depth of the call stack.
    pub fn sp(&self) -> usize {
        self.stack.sp()
    }

    pub fn reg(&self, reg: Reg) -> u8 {
        self.gpr[reg]
    }

    pub fn set_reg(&mut self, reg: Reg, value: u8) {
        self.gpr[reg] = value;
    }

    pub fn delay_timer(&self) -> u8 {
        self.dt.get()
    }

    pub fn sound_timer(&self) -> u8 {
        self.st.get()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    /// Overwrites the whole keypad, indexed by hex key value.
    pub fn set_keys(&mut self, keys: [bool; KEY_COUNT]) {
        self.keypad.set_all(keys);
    }

    /// Whether the last cycle changed the screen.
    pub fn redraw(&self) -> bool {
        self.redraw
    }

    /// Whether the sound timer was running during the last cycle.
    pub fn tone(&self) -> bool {
        self.tone
    }

    /// Number of successfully completed cycles since the last reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Number of undecodable words executed since the last reset.
    pub fn unknown_opcodes(&self) -> u64 {
        self.unknown_opcodes
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Chip8 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Chip8")
            .field("gpr", &self.gpr)
            .field("pc", &format!("{:04x}", self.pc))
            .field("i", &format!("{:04x}", self.i))
            .field("dt", &format!("{:02x}", self.dt.get()))
            .field("st", &format!("{:02x}", self.st.get()))
            .field("stack", &self.stack)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ErrorKind;

    fn chip8_with(words: &[u16]) -> Chip8 {
        let mut rom = Vec::with_capacity(words.len() * 2);
        for word in words {
            rom.push((word >> 8) as u8);
            rom.push(*word as u8);
        }
        let mut chip8 = Chip8::with_seed(7);
        chip8.load_program(&rom).unwrap();
        chip8
    }

    #[test]
    fn plain_instructions_advance_pc_by_two() {
        let words = [
            0x00E0, 0x6122, 0x7101, 0x8120, 0x8121, 0x8122, 0x8123, 0x8124, 0x8125, 0x8126,
            0x8127, 0x812E, 0xA300, 0xC1FF, 0xD001, 0xF107, 0xF115, 0xF118, 0xF11E, 0xF129,
            0xF133, 0xF155, 0xF165,
        ];
        for &word in words.iter() {
            let mut chip8 = chip8_with(&[word]);
            chip8.set_i(0x300);
            chip8.cycle().unwrap();
            assert_eq!(chip8.pc(), 0x202, "executing {:04x}", word);
        }
    }

    #[test]
    fn shifts_use_vx() {
        let mut chip8 = chip8_with(&[0x8126, 0x834E]);
        chip8.set_reg(Reg::V1, 0x05);
        chip8.set_reg(Reg::V2, 0xF0);
        chip8.set_reg(Reg::V3, 0x81);
        chip8.cycle().unwrap();
        assert_eq!(chip8.reg(Reg::V1), 0x02);
        assert_eq!(chip8.reg(Reg::Vf), 1);
        chip8.cycle().unwrap();
        assert_eq!(chip8.reg(Reg::V3), 0x02);
        assert_eq!(chip8.reg(Reg::Vf), 1);
    }

    #[test]
    fn flag_wins_when_vf_is_destination() {
        let mut chip8 = chip8_with(&[0x8F14]);
        chip8.set_reg(Reg::Vf, 0xFF);
        chip8.set_reg(Reg::V1, 0x02);
        chip8.cycle().unwrap();
        assert_eq!(chip8.reg(Reg::Vf), 1);
    }

    #[test]
    fn equal_operands_clear_borrow_flag() {
        let mut chip8 = chip8_with(&[0x8125, 0x8347]);
        chip8.set_reg(Reg::V1, 0x10);
        chip8.set_reg(Reg::V2, 0x10);
        chip8.set_reg(Reg::Vf, 0x01);
        chip8.cycle().unwrap();
        assert_eq!(chip8.reg(Reg::V1), 0);
        assert_eq!(chip8.reg(Reg::Vf), 0);

        chip8.set_reg(Reg::V3, 0x20);
        chip8.set_reg(Reg::V4, 0x30);
        chip8.cycle().unwrap();
        assert_eq!(chip8.reg(Reg::V3), 0x10);
        assert_eq!(chip8.reg(Reg::Vf), 1);
    }

    #[test]
    fn random_is_masked() {
        let mut chip8 = chip8_with(&[0xC10F, 0xC200]);
        chip8.cycle().unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.reg(Reg::V1) & 0xF0, 0);
        assert_eq!(chip8.reg(Reg::V2), 0);
    }

    #[test]
    fn seeded_machines_agree() {
        let mut a = chip8_with(&[0xC1FF, 0xC2FF, 0xC3FF]);
        let mut b = chip8_with(&[0xC1FF, 0xC2FF, 0xC3FF]);
        for _ in 0..3 {
            a.cycle().unwrap();
            b.cycle().unwrap();
        }
        for &reg in [Reg::V1, Reg::V2, Reg::V3].iter() {
            assert_eq!(a.reg(reg), b.reg(reg));
        }
    }

    #[test]
    fn unknown_opcode_is_skipped_and_counted() {
        let mut chip8 = chip8_with(&[0xFFFF, 0x6142]);
        chip8.cycle().unwrap();
        assert_eq!(chip8.pc(), 0x202);
        assert_eq!(chip8.unknown_opcodes(), 1);
        chip8.cycle().unwrap();
        assert_eq!(chip8.reg(Reg::V1), 0x42);
    }

    #[test]
    fn sys_is_a_no_op() {
        let mut chip8 = chip8_with(&[0x0123]);
        chip8.cycle().unwrap();
        assert_eq!(chip8.pc(), 0x202);
        assert_eq!(chip8.unknown_opcodes(), 0);
    }

    #[test]
    fn failed_call_leaves_pc() {
        let mut chip8 = chip8_with(&[0x2200]);
        for _ in 0..16 {
            chip8.cycle().unwrap();
        }
        assert_eq!(chip8.sp(), 16);
        match *chip8.cycle().unwrap_err().kind() {
            ErrorKind::StackOverflow => {}
            ref other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(chip8.pc(), 0x200);
        assert_eq!(chip8.sp(), 16);
    }

    #[test]
    fn reset_restores_power_on_state() {
        let mut chip8 = chip8_with(&[0x6F12, 0xA123, 0x2300]);
        chip8.keypad_mut().set(0x3, true);
        for _ in 0..3 {
            chip8.cycle().unwrap();
        }
        chip8.reset();
        assert_eq!(chip8.pc(), 0x200);
        assert_eq!(chip8.i(), 0);
        assert_eq!(chip8.sp(), 0);
        assert_eq!(chip8.reg(Reg::Vf), 0);
        assert_eq!(chip8.cycles(), 0);
        assert!(!chip8.keypad().is_pressed(0x3));
        assert!(chip8.memory().as_slice()[0x200..].iter().all(|&b| b == 0));
        assert_eq!(chip8.memory().as_slice()[0], 0xF0);
    }
}
