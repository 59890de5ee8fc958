//! Executers for the base integer instruction set
//!
//! One function per dispatch-table entry. Each executer decodes the
//! fields it needs, performs its semantic effect, and leaves the
//! program counter pointing at the next instruction to run. The
//! register-register group multiplexes on the funct7 overlay bits:
//! bit 30 selects the alternate base operation (sub, sra) and bit 25
//! selects the multiply/divide extension (see
//! [`rv32m`](super::rv32m)).

use crate::bits::sext;
use crate::fields;
use crate::opcodes::*;

use super::memory::Wordsize;
use super::rv32m;
use super::{DispatchTable, Fault, Hart, Status};

/// Install the executers for the full RV32IM dispatch table. Families
/// that ignore funct3 (lui, auipc, jal) occupy all eight keys of
/// their opcode group; every key left untouched faults as an illegal
/// instruction.
pub fn make_rv32im(table: &mut DispatchTable) {
    table.set_group(OP_LUI, execute_lui);
    table.set_group(OP_AUIPC, execute_auipc);
    table.set_group(OP_JAL, execute_jal);
    table.set(key(OP_JALR, 0b000), execute_jalr);

    table.set(key(OP_BRANCH, FUNCT3_BEQ), execute_beq);
    table.set(key(OP_BRANCH, FUNCT3_BNE), execute_bne);
    table.set(key(OP_BRANCH, FUNCT3_BLT), execute_blt);
    table.set(key(OP_BRANCH, FUNCT3_BGE), execute_bge);
    table.set(key(OP_BRANCH, FUNCT3_BLTU), execute_bltu);
    table.set(key(OP_BRANCH, FUNCT3_BGEU), execute_bgeu);

    table.set(key(OP_LOAD, FUNCT3_B), execute_lb);
    table.set(key(OP_LOAD, FUNCT3_H), execute_lh);
    table.set(key(OP_LOAD, FUNCT3_W), execute_lw);
    table.set(key(OP_LOAD, FUNCT3_BU), execute_lbu);
    table.set(key(OP_LOAD, FUNCT3_HU), execute_lhu);

    table.set(key(OP_STORE, FUNCT3_B), execute_sb);
    table.set(key(OP_STORE, FUNCT3_H), execute_sh);
    table.set(key(OP_STORE, FUNCT3_W), execute_sw);

    table.set(key(OP_IMM, FUNCT3_ADDI), execute_addi);
    table.set(key(OP_IMM, FUNCT3_SLLI), execute_slli);
    table.set(key(OP_IMM, FUNCT3_SLTI), execute_slti);
    table.set(key(OP_IMM, FUNCT3_SLTIU), execute_sltiu);
    table.set(key(OP_IMM, FUNCT3_XORI), execute_xori);
    table.set(key(OP_IMM, FUNCT3_SRLI_SRAI), execute_srli_srai);
    table.set(key(OP_IMM, FUNCT3_ORI), execute_ori);
    table.set(key(OP_IMM, FUNCT3_ANDI), execute_andi);

    table.set(key(OP, FUNCT3_ADD_SUB_MUL), execute_add_sub_mul);
    table.set(key(OP, FUNCT3_SLL_MULH), execute_sll_mulh);
    table.set(key(OP, FUNCT3_SLT_MULHSU), execute_slt_mulhsu);
    table.set(key(OP, FUNCT3_SLTU_MULHU), execute_sltu_mulhu);
    table.set(key(OP, FUNCT3_XOR_DIV), execute_xor_div);
    table.set(key(OP, FUNCT3_SRL_SRA_DIVU), execute_srl_sra_divu);
    table.set(key(OP, FUNCT3_OR_REM), execute_or_rem);
    table.set(key(OP, FUNCT3_AND_REMU), execute_and_remu);
}

/// Load the upper immediate into rd, low 12 bits zero
fn execute_lui(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    hart.set_x(fields::rd(instr), fields::u_immediate(instr));
    hart.increment_pc();
    Ok(())
}

/// Add the upper immediate to the byte address of this instruction
fn execute_auipc(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let value = (hart.pc << 2).wrapping_add(fields::u_immediate(instr));
    hart.set_x(fields::rd(instr), value);
    hart.increment_pc();
    Ok(())
}

/// Jump and link. A zero 20-bit payload encodes `jal x0, 0`, a jump
/// to itself: that instruction ends the program instead of spinning,
/// and writes neither rd nor the program counter.
fn execute_jal(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    if instr >> 12 == 0 {
        hart.status = Status::Ended;
        return Ok(());
    }
    let return_address = hart.pc.wrapping_add(1) << 2;
    hart.jump_relative(fields::imm_jtype(instr))?;
    hart.set_x(fields::rd(instr), return_address);
    Ok(())
}

/// Jump and link register: the target byte address is rs1 plus the
/// I-type immediate, converted to a word index (which also discards
/// the low bits the ISA requires to be masked)
fn execute_jalr(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let return_address = hart.pc.wrapping_add(1) << 2;
    let target = hart.x(fields::rs1(instr)).wrapping_add(fields::imm_itype(instr));
    hart.jump_to(target >> 2)?;
    hart.set_x(fields::rd(instr), return_address);
    Ok(())
}

fn branch_sources(hart: &Hart, instr: u32) -> (u32, u32) {
    (hart.x(fields::rs1(instr)), hart.x(fields::rs2(instr)))
}

/// Redirect the program counter by the B-type offset on a taken
/// branch; fall through to the next instruction otherwise
fn branch_on(hart: &mut Hart, instr: u32, taken: bool) -> Result<(), Fault> {
    if taken {
        hart.jump_relative(fields::imm_btype(instr))
    } else {
        hart.increment_pc();
        Ok(())
    }
}

fn execute_beq(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = branch_sources(hart, instr);
    branch_on(hart, instr, src1 == src2)
}

fn execute_bne(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = branch_sources(hart, instr);
    branch_on(hart, instr, src1 != src2)
}

fn execute_blt(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = branch_sources(hart, instr);
    branch_on(hart, instr, (src1 as i32) < (src2 as i32))
}

fn execute_bge(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = branch_sources(hart, instr);
    branch_on(hart, instr, (src1 as i32) >= (src2 as i32))
}

fn execute_bltu(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = branch_sources(hart, instr);
    branch_on(hart, instr, src1 < src2)
}

fn execute_bgeu(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = branch_sources(hart, instr);
    branch_on(hart, instr, src1 >= src2)
}

fn load_address(hart: &Hart, instr: u32) -> u32 {
    hart.x(fields::rs1(instr)).wrapping_add(fields::imm_itype(instr))
}

/// Finish a load: write the loaded value and advance the pc. Kept
/// separate so the memory read can fault first, leaving rd untouched.
fn finish_load(hart: &mut Hart, instr: u32, value: u32) {
    hart.set_x(fields::rd(instr), value);
    hart.increment_pc();
}

fn execute_lb(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let value = hart.memory.read(load_address(hart, instr), Wordsize::Byte)?;
    finish_load(hart, instr, sext(value, 8));
    Ok(())
}

fn execute_lh(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let value = hart.memory.read(load_address(hart, instr), Wordsize::Halfword)?;
    finish_load(hart, instr, sext(value, 16));
    Ok(())
}

fn execute_lw(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let value = hart.memory.read(load_address(hart, instr), Wordsize::Word)?;
    finish_load(hart, instr, value);
    Ok(())
}

fn execute_lbu(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let value = hart.memory.read(load_address(hart, instr), Wordsize::Byte)?;
    finish_load(hart, instr, value);
    Ok(())
}

fn execute_lhu(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let value = hart.memory.read(load_address(hart, instr), Wordsize::Halfword)?;
    finish_load(hart, instr, value);
    Ok(())
}

fn store_address(hart: &Hart, instr: u32) -> u32 {
    hart.x(fields::rs1(instr)).wrapping_add(fields::imm_stype(instr))
}

fn execute_sb(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let value = hart.x(fields::rs2(instr));
    hart.memory.write(store_address(hart, instr), value, Wordsize::Byte)?;
    hart.increment_pc();
    Ok(())
}

fn execute_sh(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let value = hart.x(fields::rs2(instr));
    hart.memory.write(store_address(hart, instr), value, Wordsize::Halfword)?;
    hart.increment_pc();
    Ok(())
}

fn execute_sw(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let value = hart.x(fields::rs2(instr));
    hart.memory.write(store_address(hart, instr), value, Wordsize::Word)?;
    hart.increment_pc();
    Ok(())
}

/// Finish a register-immediate or register-register operation
fn finish_op(hart: &mut Hart, instr: u32, value: u32) -> Result<(), Fault> {
    hart.set_x(fields::rd(instr), value);
    hart.increment_pc();
    Ok(())
}

fn execute_addi(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let src = hart.x(fields::rs1(instr));
    finish_op(hart, instr, src.wrapping_add(fields::imm_itype(instr)))
}

fn execute_slli(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let src = hart.x(fields::rs1(instr));
    finish_op(hart, instr, src << fields::shamt(instr))
}

fn execute_slti(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let src = hart.x(fields::rs1(instr)) as i32;
    let imm = fields::imm_itype(instr) as i32;
    finish_op(hart, instr, (src < imm) as u32)
}

fn execute_sltiu(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let src = hart.x(fields::rs1(instr));
    finish_op(hart, instr, (src < fields::imm_itype(instr)) as u32)
}

fn execute_xori(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let src = hart.x(fields::rs1(instr));
    finish_op(hart, instr, src ^ fields::imm_itype(instr))
}

fn execute_srli_srai(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let src = hart.x(fields::rs1(instr));
    let shift_by = fields::shamt(instr);
    let value = if fields::is_alt(instr) {
        ((src as i32) >> shift_by) as u32
    } else {
        src >> shift_by
    };
    finish_op(hart, instr, value)
}

fn execute_ori(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let src = hart.x(fields::rs1(instr));
    finish_op(hart, instr, src | fields::imm_itype(instr))
}

fn execute_andi(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let src = hart.x(fields::rs1(instr));
    finish_op(hart, instr, src & fields::imm_itype(instr))
}

fn reg_reg_sources(hart: &Hart, instr: u32) -> (u32, u32) {
    (hart.x(fields::rs1(instr)), hart.x(fields::rs2(instr)))
}

fn execute_add_sub_mul(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = reg_reg_sources(hart, instr);
    let value = if fields::is_muldiv(instr) {
        rv32m::mul(src1, src2)
    } else if fields::is_alt(instr) {
        src1.wrapping_sub(src2)
    } else {
        src1.wrapping_add(src2)
    };
    finish_op(hart, instr, value)
}

fn execute_sll_mulh(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = reg_reg_sources(hart, instr);
    let value = if fields::is_muldiv(instr) {
        rv32m::mulh(src1, src2)
    } else {
        src1 << (src2 & 0x1f)
    };
    finish_op(hart, instr, value)
}

fn execute_slt_mulhsu(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = reg_reg_sources(hart, instr);
    let value = if fields::is_muldiv(instr) {
        rv32m::mulhsu(src1, src2)
    } else {
        ((src1 as i32) < (src2 as i32)) as u32
    };
    finish_op(hart, instr, value)
}

fn execute_sltu_mulhu(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = reg_reg_sources(hart, instr);
    let value = if fields::is_muldiv(instr) {
        rv32m::mulhu(src1, src2)
    } else {
        (src1 < src2) as u32
    };
    finish_op(hart, instr, value)
}

fn execute_xor_div(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = reg_reg_sources(hart, instr);
    let value = if fields::is_muldiv(instr) {
        rv32m::div(src1, src2)
    } else {
        src1 ^ src2
    };
    finish_op(hart, instr, value)
}

fn execute_srl_sra_divu(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = reg_reg_sources(hart, instr);
    let value = if fields::is_muldiv(instr) {
        rv32m::divu(src1, src2)
    } else {
        let shift_by = src2 & 0x1f;
        if fields::is_alt(instr) {
            ((src1 as i32) >> shift_by) as u32
        } else {
            src1 >> shift_by
        }
    };
    finish_op(hart, instr, value)
}

fn execute_or_rem(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = reg_reg_sources(hart, instr);
    let value = if fields::is_muldiv(instr) {
        rv32m::rem(src1, src2)
    } else {
        src1 | src2
    };
    finish_op(hart, instr, value)
}

fn execute_and_remu(hart: &mut Hart, instr: u32) -> Result<(), Fault> {
    let (src1, src2) = reg_reg_sources(hart, instr);
    let value = if fields::is_muldiv(instr) {
        rv32m::remu(src1, src2)
    } else {
        src1 & src2
    };
    finish_op(hart, instr, value)
}
