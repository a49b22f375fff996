use std::fmt;

use enum_primitive::FromPrimitive;

/// Raw 16-bit instruction as fetched from memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InstructionWord(pub u16);

impl InstructionWord {
    /// Most significant nibble, selects the instruction family.
    pub fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }

    pub fn kk(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn n(self) -> u8 {
        (self.0 & 0xF) as u8
    }

    pub fn x_reg(self) -> Reg {
        Reg::from_nibble((self.0 >> 8) as u8)
    }

    pub fn y_reg(self) -> Reg {
        Reg::from_nibble((self.0 >> 4) as u8)
    }
}

enum_from_primitive! {
/// One of the sixteen general purpose registers.
///
/// `Vf` doubles as the carry/borrow/collision flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    V0 = 0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    Va,
    Vb,
    Vc,
    Vd,
    Ve,
    Vf,
}
}

impl Reg {
    /// Register selected by the low four bits of `nibble`.
    pub fn from_nibble(nibble: u8) -> Reg {
        // Masked to four bits so the lookup can't miss.
        Reg::from_u8(nibble & 0x0F).unwrap_or(Reg::V0)
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

/// 12-bit memory address operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Addr(pub u16);

/// 8-bit immediate operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Imm(pub u8);

/// 4-bit immediate operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Imm4(pub u8);

/// Operation of the `8xyN` register-to-register family.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fun {
    Id,
    Or,
    And,
    Xor,
    Add,
    Subtract,
    ShiftRight,
    SubtractInv,
    ShiftLeft,
}

impl Fun {
    fn from_nibble(n: u8) -> Option<Fun> {
        use self::Fun::*;
        let f = match n {
            0x0 => Id,
            0x1 => Or,
            0x2 => And,
            0x3 => Xor,
            0x4 => Add,
            0x5 => Subtract,
            0x6 => ShiftRight,
            0x7 => SubtractInv,
            0xE => ShiftLeft,
            _ => return None,
        };
        Some(f)
    }

    fn nibble(self) -> u16 {
        use self::Fun::*;
        match self {
            Id => 0x0,
            Or => 0x1,
            And => 0x2,
            Xor => 0x3,
            Add => 0x4,
            Subtract => 0x5,
            ShiftRight => 0x6,
            SubtractInv => 0x7,
            ShiftLeft => 0xE,
        }
    }
}

/// A decoded instruction.
///
/// `inv` on the skip variants flips the condition (skip if *not* equal / *not* pressed).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0`
    ClearScreen,
    /// `00EE`
    Ret,
    /// `0nnn`, call into host machine code.
    Sys(Addr),
    /// `1nnn`
    Jump(Addr),
    /// `2nnn`
    Call(Addr),
    /// `3xkk` / `4xkk`
    SkipEqImm { vx: Reg, imm: Imm, inv: bool },
    /// `5xy0` / `9xy0`
    SkipEqReg { vx: Reg, vy: Reg, inv: bool },
    /// `6xkk`
    PutImm { vx: Reg, imm: Imm },
    /// `7xkk`
    AddImm { vx: Reg, imm: Imm },
    /// `8xyN`
    Apply { vx: Reg, vy: Reg, f: Fun },
    /// `Annn`
    SetI(Addr),
    /// `Bnnn`
    JumpPlusV0(Addr),
    /// `Cxkk`
    Randomize { vx: Reg, imm: Imm },
    /// `Dxyn`
    Draw { vx: Reg, vy: Reg, n: Imm4 },
    /// `Ex9E` / `ExA1`
    SkipPressed { vx: Reg, inv: bool },
    /// `Fx07`
    GetDT(Reg),
    /// `Fx0A`
    WaitKey(Reg),
    /// `Fx15`
    SetDT(Reg),
    /// `Fx18`
    SetST(Reg),
    /// `Fx1E`
    AddI(Reg),
    /// `Fx29`
    LoadGlyph(Reg),
    /// `Fx33`
    StoreBCD(Reg),
    /// `Fx55`
    StoreRegs(Reg),
    /// `Fx65`
    LoadRegs(Reg),
    /// Any word that matches none of the above.
    Unknown(InstructionWord),
}

impl Instruction {
    /// Decodes a word. Every word maps to exactly one instruction; words outside
    /// the instruction set come back as `Unknown`.
    pub fn decode(word: InstructionWord) -> Instruction {
        use self::Instruction::*;

        let vx = word.x_reg();
        let vy = word.y_reg();
        let addr = Addr(word.nnn());
        let imm = Imm(word.kk());

        match word.family() {
            0x0 => match word.0 {
                0x00E0 => ClearScreen,
                0x00EE => Ret,
                _ => Sys(addr),
            },
            0x1 => Jump(addr),
            0x2 => Call(addr),
            0x3 => SkipEqImm { vx, imm, inv: false },
            0x4 => SkipEqImm { vx, imm, inv: true },
            0x5 if word.n() == 0 => SkipEqReg { vx, vy, inv: false },
            0x6 => PutImm { vx, imm },
            0x7 => AddImm { vx, imm },
            0x8 => match Fun::from_nibble(word.n()) {
                Some(f) => Apply { vx, vy, f },
                None => Unknown(word),
            },
            0x9 if word.n() == 0 => SkipEqReg { vx, vy, inv: true },
            0xA => SetI(addr),
            0xB => JumpPlusV0(addr),
            0xC => Randomize { vx, imm },
            0xD => Draw { vx, vy, n: Imm4(word.n()) },
            0xE => match word.kk() {
                0x9E => SkipPressed { vx, inv: false },
                0xA1 => SkipPressed { vx, inv: true },
                _ => Unknown(word),
            },
            0xF => match word.kk() {
                0x07 => GetDT(vx),
                0x0A => WaitKey(vx),
                0x15 => SetDT(vx),
                0x18 => SetST(vx),
                0x1E => AddI(vx),
                0x29 => LoadGlyph(vx),
                0x33 => StoreBCD(vx),
                0x55 => StoreRegs(vx),
                0x65 => LoadRegs(vx),
                _ => Unknown(word),
            },
            _ => Unknown(word),
        }
    }

    /// Encodes back into a word. `decode(encode(i)) == i` for every instruction
    /// `decode` can produce.
    pub fn encode(&self) -> InstructionWord {
        use self::Instruction::*;

        fn x(r: Reg) -> u16 {
            (r.index() as u16) << 8
        }
        fn y(r: Reg) -> u16 {
            (r.index() as u16) << 4
        }

        let word = match *self {
            ClearScreen => 0x00E0,
            Ret => 0x00EE,
            Sys(addr) => addr.0 & 0x0FFF,
            Jump(addr) => 0x1000 | (addr.0 & 0x0FFF),
            Call(addr) => 0x2000 | (addr.0 & 0x0FFF),
            SkipEqImm { vx, imm, inv } => {
                let family = if inv { 0x4000 } else { 0x3000 };
                family | x(vx) | imm.0 as u16
            }
            SkipEqReg { vx, vy, inv } => {
                let family = if inv { 0x9000 } else { 0x5000 };
                family | x(vx) | y(vy)
            }
            PutImm { vx, imm } => 0x6000 | x(vx) | imm.0 as u16,
            AddImm { vx, imm } => 0x7000 | x(vx) | imm.0 as u16,
            Apply { vx, vy, f } => 0x8000 | x(vx) | y(vy) | f.nibble(),
            SetI(addr) => 0xA000 | (addr.0 & 0x0FFF),
            JumpPlusV0(addr) => 0xB000 | (addr.0 & 0x0FFF),
            Randomize { vx, imm } => 0xC000 | x(vx) | imm.0 as u16,
            Draw { vx, vy, n } => 0xD000 | x(vx) | y(vy) | (n.0 & 0xF) as u16,
            SkipPressed { vx, inv } => 0xE000 | x(vx) | (if inv { 0xA1 } else { 0x9E }),
            GetDT(vx) => 0xF007 | x(vx),
            WaitKey(vx) => 0xF00A | x(vx),
            SetDT(vx) => 0xF015 | x(vx),
            SetST(vx) => 0xF018 | x(vx),
            AddI(vx) => 0xF01E | x(vx),
            LoadGlyph(vx) => 0xF029 | x(vx),
            StoreBCD(vx) => 0xF033 | x(vx),
            StoreRegs(vx) => 0xF055 | x(vx),
            LoadRegs(vx) => 0xF065 | x(vx),
            Unknown(word) => word.0,
        };

        InstructionWord(word)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "V{:X}", self.index())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Instruction::*;

        match *self {
            ClearScreen => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Sys(addr) => write!(f, "SYS {:#05x}", addr.0),
            Jump(addr) => write!(f, "JP {:#05x}", addr.0),
            Call(addr) => write!(f, "CALL {:#05x}", addr.0),
            SkipEqImm { vx, imm, inv: false } => write!(f, "SE {}, {:#04x}", vx, imm.0),
            SkipEqImm { vx, imm, inv: true } => write!(f, "SNE {}, {:#04x}", vx, imm.0),
            SkipEqReg { vx, vy, inv: false } => write!(f, "SE {}, {}", vx, vy),
            SkipEqReg { vx, vy, inv: true } => write!(f, "SNE {}, {}", vx, vy),
            PutImm { vx, imm } => write!(f, "LD {}, {:#04x}", vx, imm.0),
            AddImm { vx, imm } => write!(f, "ADD {}, {:#04x}", vx, imm.0),
            Apply { vx, vy, f: fun } => {
                let mnemonic = match fun {
                    Fun::Id => "LD",
                    Fun::Or => "OR",
                    Fun::And => "AND",
                    Fun::Xor => "XOR",
                    Fun::Add => "ADD",
                    Fun::Subtract => "SUB",
                    Fun::ShiftRight => "SHR",
                    Fun::SubtractInv => "SUBN",
                    Fun::ShiftLeft => "SHL",
                };
                write!(f, "{} {}, {}", mnemonic, vx, vy)
            }
            SetI(addr) => write!(f, "LD I, {:#05x}", addr.0),
            JumpPlusV0(addr) => write!(f, "JP V0, {:#05x}", addr.0),
            Randomize { vx, imm } => write!(f, "RND {}, {:#04x}", vx, imm.0),
            Draw { vx, vy, n } => write!(f, "DRW {}, {}, {}", vx, vy, n.0),
            SkipPressed { vx, inv: false } => write!(f, "SKP {}", vx),
            SkipPressed { vx, inv: true } => write!(f, "SKNP {}", vx),
            GetDT(vx) => write!(f, "LD {}, DT", vx),
            WaitKey(vx) => write!(f, "LD {}, K", vx),
            SetDT(vx) => write!(f, "LD DT, {}", vx),
            SetST(vx) => write!(f, "LD ST, {}", vx),
            AddI(vx) => write!(f, "ADD I, {}", vx),
            LoadGlyph(vx) => write!(f, "LD F, {}", vx),
            StoreBCD(vx) => write!(f, "LD B, {}", vx),
            StoreRegs(vx) => write!(f, "LD [I], {}", vx),
            LoadRegs(vx) => write!(f, "LD {}, [I]", vx),
            Unknown(word) => write!(f, "DW {:#06x}", word.0),
        }
    }
}
