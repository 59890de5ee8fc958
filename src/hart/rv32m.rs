//! Multiply/divide extension semantics
//!
//! Pure value-level operations for the funct7-selected overlay of the
//! register-register opcode group. Division by zero and signed
//! division overflow are not faults; they produce the architecturally
//! defined results:
//!
//! * div by zero: quotient -1 (all ones), remainder = dividend
//! * divu by zero: quotient 0xffff_ffff, remainder = dividend
//! * INT32_MIN / -1: quotient INT32_MIN, remainder 0

/// Low 32 bits of the product (the same for signed and unsigned
/// interpretations of the operands)
pub fn mul(src1: u32, src2: u32) -> u32 {
    src1.wrapping_mul(src2)
}

/// High 32 bits of the signed x signed 64-bit product
pub fn mulh(src1: u32, src2: u32) -> u32 {
    let product = i64::from(src1 as i32) * i64::from(src2 as i32);
    (product >> 32) as u32
}

/// High 32 bits of the signed x unsigned 64-bit product
pub fn mulhsu(src1: u32, src2: u32) -> u32 {
    let product = i64::from(src1 as i32) * i64::from(src2);
    (product >> 32) as u32
}

/// High 32 bits of the unsigned x unsigned 64-bit product
pub fn mulhu(src1: u32, src2: u32) -> u32 {
    let product = u64::from(src1) * u64::from(src2);
    (product >> 32) as u32
}

/// Signed quotient, rounded towards zero. wrapping_div covers the
/// INT32_MIN / -1 overflow case.
pub fn div(dividend: u32, divisor: u32) -> u32 {
    if divisor == 0 {
        0xffff_ffff
    } else {
        (dividend as i32).wrapping_div(divisor as i32) as u32
    }
}

/// Unsigned quotient
pub fn divu(dividend: u32, divisor: u32) -> u32 {
    if divisor == 0 {
        0xffff_ffff
    } else {
        dividend / divisor
    }
}

/// Signed remainder, carrying the sign of the dividend
pub fn rem(dividend: u32, divisor: u32) -> u32 {
    if divisor == 0 {
        dividend
    } else {
        (dividend as i32).wrapping_rem(divisor as i32) as u32
    }
}

/// Unsigned remainder
pub fn remu(dividend: u32, divisor: u32) -> u32 {
    if divisor == 0 {
        dividend
    } else {
        dividend % divisor
    }
}
