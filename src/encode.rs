//! Instruction encoders
//!
//! The inverse of [`fields`](crate::fields): functions and macros that
//! assemble instruction words, used by the test suites to build
//! programs. The per-mnemonic macros expect RISC-V register names
//! (e.g. `addi!(x11, x0, 5)`) and return errors via `?`, so callers
//! are written as functions returning `Result<_, &'static str>`.
//!
//! Note: the macros resolve opcode constants at the call site, so use
//! them through a glob import (`use rv32sim::encode::*`).

pub use crate::opcodes::*;
use crate::bits::field;

/// Make an I-type instruction. Only produces a valid I-type
/// instruction if the arguments are in range.
pub fn itype(imm: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    imm << 20 | rs1 << 15 | funct3 << 12 | rd << 7 | opcode
}

/// Make a U- or J-type instruction (if you are making a J-type
/// instruction, construct the 20-bit field with [`jtype_imm_field`])
pub fn ujtype(imm: u32, rd: u32, opcode: u32) -> u32 {
    imm << 12 | rd << 7 | opcode
}

/// Make an R- or S-type instruction. These instructions have the same
/// number of fields of the same size. The meaning of a and b is:
///
/// R-type: a = funct7, b = rd
/// S-type: a = imm[11:5], b = imm[4:0]
pub fn rstype(a: u32, rs2: u32, rs1: u32, funct3: u32, b: u32, opcode: u32) -> u32 {
    a << 25 | rs2 << 20 | rs1 << 15 | funct3 << 12 | b << 7 | opcode
}

/// Convert a RISC-V register name (e.g. x3) to the register value
/// (e.g. 3)
pub fn reg_num_impl(reg_name: &str) -> Result<u32, &'static str> {
    let n = reg_name
        .strip_prefix('x')
        .ok_or("register name must begin with x")?
        .parse::<u32>()
        .map_err(|_| "register name must end in one or two digits")?;
    if n > 31 {
        return Err("register index exceeds 31");
    }
    Ok(n)
}

#[macro_export]
macro_rules! reg_num {
    ($reg:expr) => {
        $crate::encode::reg_num_impl(std::stringify!($reg))?
    };
}
pub use reg_num;

/// The shift-by-immediate instructions use I-type, but with a special
/// encoding of the immediate that uses the lower 5 bits for the shift
/// amount (shamt) and the upper 7 bits to distinguish between
/// arithmetical and logical right shift
pub fn shifts_imm_field(shamt: u32, upper: u32) -> u32 {
    (upper << 5) | field(shamt, 4, 0)
}

/// Takes a byte offset and shuffles it into the format required for
/// the 20-bit field of the U-type instruction (making it J-type)
pub fn jtype_imm_field(imm: i32) -> u32 {
    let imm = imm as u32;
    let imm20 = field(imm, 20, 20);
    let imm19_12 = field(imm, 19, 12);
    let imm11 = field(imm, 11, 11);
    let imm10_1 = field(imm, 10, 1);
    (imm20 << 19) | (imm10_1 << 9) | (imm11 << 8) | imm19_12
}

/// Returns (a, b) suitable for use with rstype for the conditional
/// branch instructions (btype)
pub fn btype_imm_fields(imm: i32) -> (u32, u32) {
    let imm = imm as u32;
    let imm12 = field(imm, 12, 12);
    let imm11 = field(imm, 11, 11);
    let imm10_5 = field(imm, 10, 5);
    let imm4_1 = field(imm, 4, 1);
    let a = (imm12 << 6) | imm10_5;
    let b = (imm4_1 << 1) | imm11;
    (a, b)
}

/// Concatenate instruction words into a flat little-endian image,
/// ready for loading at address 0
pub fn program(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

macro_rules! itype_instr {
    ($instruction:ident, $funct3:expr, $opcode:expr) => {
        #[macro_export]
        macro_rules! $instruction {
            ($rd:ident, $rs1:expr, $imm:expr) => {{
                let rd = reg_num!($rd);
                let rs1 = reg_num!($rs1);
                let imm: i32 = $imm.into();
                $crate::encode::itype(imm as u32, rs1, $funct3, rd, $opcode)
            }};
        }
        pub use $instruction;
    };
}

/// Here, upper is the only special value, which is always zero apart
/// from in srai, where it is 0b0100000.
macro_rules! shift_instr {
    ($instruction:ident, $upper:expr, $funct3:expr, $opcode:expr) => {
        #[macro_export]
        macro_rules! $instruction {
            ($rd:ident, $rs1:expr, $imm:expr) => {{
                let rd = reg_num!($rd);
                let rs1 = reg_num!($rs1);
                let imm = $crate::encode::shifts_imm_field($imm, $upper);
                $crate::encode::itype(imm, rs1, $funct3, rd, $opcode)
            }};
        }
        pub use $instruction;
    };
}

macro_rules! rtype_instr {
    ($instruction:ident, $funct7:expr, $funct3:expr, $opcode:expr) => {
        #[macro_export]
        macro_rules! $instruction {
            ($rd:ident, $rs1:expr, $rs2:expr) => {{
                let rd = reg_num!($rd);
                let rs1 = reg_num!($rs1);
                let rs2 = reg_num!($rs2);
                $crate::encode::rstype($funct7, rs2, rs1, $funct3, rd, $opcode)
            }};
        }
        pub use $instruction;
    };
}

macro_rules! stype_instr {
    ($instruction:ident, $funct3:expr, $opcode:expr) => {
        #[macro_export]
        macro_rules! $instruction {
            ($rs2:expr, $rs1:expr, $imm:expr) => {{
                let rs1 = reg_num!($rs1);
                let rs2 = reg_num!($rs2);
                let imm: i32 = $imm.into();
                let imm11_5 = $crate::bits::field(imm as u32, 11, 5);
                let imm4_0 = $crate::bits::field(imm as u32, 4, 0);
                $crate::encode::rstype(imm11_5, rs2, rs1, $funct3, imm4_0, $opcode)
            }};
        }
        pub use $instruction;
    };
}

macro_rules! btype_instr {
    ($instruction:ident, $funct3:expr, $opcode:expr) => {
        #[macro_export]
        macro_rules! $instruction {
            ($rs1:expr, $rs2:expr, $imm:expr) => {{
                let rs1 = reg_num!($rs1);
                let rs2 = reg_num!($rs2);
                let (a, b) = $crate::encode::btype_imm_fields($imm);
                $crate::encode::rstype(a, rs2, rs1, $funct3, b, $opcode)
            }};
        }
        pub use $instruction;
    };
}

/// Note: in these instructions (LUI and AUIPC), the immediate imm is
/// already the upper 20 bits that will be loaded -- it will not be
/// shifted up.
macro_rules! utype_instr {
    ($instruction:ident, $opcode:expr) => {
        #[macro_export]
        macro_rules! $instruction {
            ($rd:expr, $imm:expr) => {{
                let rd = reg_num!($rd);
                let imm: i32 = $imm.into();
                $crate::encode::ujtype(imm as u32, rd, $opcode)
            }};
        }
        pub use $instruction;
    };
}

#[macro_export]
macro_rules! jal {
    ($rd:expr, $imm:expr) => {{
        let rd = reg_num!($rd);
        let imm = $crate::encode::jtype_imm_field($imm);
        $crate::encode::ujtype(imm, rd, $crate::opcodes::OP_JAL)
    }};
}
pub use jal;

utype_instr!(lui, OP_LUI);
utype_instr!(auipc, OP_AUIPC);
// jal is defined above
itype_instr!(jalr, 0b000, OP_JALR);

// Conditional branches
btype_instr!(beq, FUNCT3_BEQ, OP_BRANCH);
btype_instr!(bne, FUNCT3_BNE, OP_BRANCH);
btype_instr!(blt, FUNCT3_BLT, OP_BRANCH);
btype_instr!(bge, FUNCT3_BGE, OP_BRANCH);
btype_instr!(bltu, FUNCT3_BLTU, OP_BRANCH);
btype_instr!(bgeu, FUNCT3_BGEU, OP_BRANCH);

// Loads
itype_instr!(lb, FUNCT3_B, OP_LOAD);
itype_instr!(lh, FUNCT3_H, OP_LOAD);
itype_instr!(lw, FUNCT3_W, OP_LOAD);
itype_instr!(lbu, FUNCT3_BU, OP_LOAD);
itype_instr!(lhu, FUNCT3_HU, OP_LOAD);

// Stores
stype_instr!(sb, FUNCT3_B, OP_STORE);
stype_instr!(sh, FUNCT3_H, OP_STORE);
stype_instr!(sw, FUNCT3_W, OP_STORE);

// Integer register-immediate instructions
itype_instr!(addi, FUNCT3_ADDI, OP_IMM);
itype_instr!(slti, FUNCT3_SLTI, OP_IMM);
itype_instr!(sltiu, FUNCT3_SLTIU, OP_IMM);
itype_instr!(xori, FUNCT3_XORI, OP_IMM);
itype_instr!(ori, FUNCT3_ORI, OP_IMM);
itype_instr!(andi, FUNCT3_ANDI, OP_IMM);

// Shift-by-immediate instructions
shift_instr!(slli, FUNCT7_BASE, FUNCT3_SLLI, OP_IMM);
shift_instr!(srli, FUNCT7_BASE, FUNCT3_SRLI_SRAI, OP_IMM);
shift_instr!(srai, FUNCT7_ALT, FUNCT3_SRLI_SRAI, OP_IMM);

// Integer register-register instructions
rtype_instr!(add, FUNCT7_BASE, FUNCT3_ADD_SUB_MUL, OP);
rtype_instr!(sub, FUNCT7_ALT, FUNCT3_ADD_SUB_MUL, OP);
rtype_instr!(sll, FUNCT7_BASE, FUNCT3_SLL_MULH, OP);
rtype_instr!(slt, FUNCT7_BASE, FUNCT3_SLT_MULHSU, OP);
rtype_instr!(sltu, FUNCT7_BASE, FUNCT3_SLTU_MULHU, OP);
rtype_instr!(xor, FUNCT7_BASE, FUNCT3_XOR_DIV, OP);
rtype_instr!(srl, FUNCT7_BASE, FUNCT3_SRL_SRA_DIVU, OP);
rtype_instr!(sra, FUNCT7_ALT, FUNCT3_SRL_SRA_DIVU, OP);
rtype_instr!(or, FUNCT7_BASE, FUNCT3_OR_REM, OP);
rtype_instr!(and, FUNCT7_BASE, FUNCT3_AND_REMU, OP);

// Multiplication and division
rtype_instr!(mul, FUNCT7_MULDIV, FUNCT3_ADD_SUB_MUL, OP);
rtype_instr!(mulh, FUNCT7_MULDIV, FUNCT3_SLL_MULH, OP);
rtype_instr!(mulhsu, FUNCT7_MULDIV, FUNCT3_SLT_MULHSU, OP);
rtype_instr!(mulhu, FUNCT7_MULDIV, FUNCT3_SLTU_MULHU, OP);
rtype_instr!(div, FUNCT7_MULDIV, FUNCT3_XOR_DIV, OP);
rtype_instr!(divu, FUNCT7_MULDIV, FUNCT3_SRL_SRA_DIVU, OP);
rtype_instr!(rem, FUNCT7_MULDIV, FUNCT3_OR_REM, OP);
rtype_instr!(remu, FUNCT7_MULDIV, FUNCT3_AND_REMU, OP);

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn check_itype_encoding() -> Result<(), &'static str> {
        assert_eq!(addi!(x11, x0, 5), 0x0050_0593);
        assert_eq!(addi!(x1, x1, -1), 0xfff0_8093);
        Ok(())
    }

    #[test]
    fn check_btype_encoding() -> Result<(), &'static str> {
        assert_eq!(blt!(x10, x11, -4), 0xfeb5_4ee3);
        Ok(())
    }

    #[test]
    fn check_jtype_encoding() -> Result<(), &'static str> {
        assert_eq!(jal!(x1, -8), 0xff9f_f0ef);
        // Zero offset and zero destination is the halt encoding
        assert_eq!(jal!(x0, 0), 0x0000_006f);
        Ok(())
    }

    #[test]
    fn check_stype_encoding() -> Result<(), &'static str> {
        assert_eq!(sw!(x2, x1, 8), 0x0020_a423);
        assert_eq!(sw!(x2, x1, -4), 0xfe20_ae23);
        Ok(())
    }

    #[test]
    fn check_rtype_encoding() -> Result<(), &'static str> {
        assert_eq!(add!(x1, x2, x3), 0x0031_0133);
        assert_eq!(sub!(x1, x2, x3), 0x4031_0133);
        assert_eq!(mul!(x1, x2, x3), 0x0231_0133);
        Ok(())
    }

    #[test]
    fn check_program_is_little_endian() {
        let image = program(&[0x0050_0593, 0x0000_006f]);
        assert_eq!(image, [0x93, 0x05, 0x50, 0x00, 0x6f, 0x00, 0x00, 0x00]);
    }
}
