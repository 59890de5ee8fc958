//! End-to-end scenarios driven through the public Hart API

use itertools::iproduct;

use rv32sim::encode::*;
use rv32sim::hart::{Fault, Hart, Status};

fn hart_with_program(words: &[u32]) -> Hart {
    let mut hart = Hart::new();
    hart.load_image(&program(words));
    hart
}

/// Tick until the hart stops or the budget runs out, returning the
/// number of instructions executed
fn run_to_completion(hart: &mut Hart, limit: u64) -> u64 {
    let mut count = 0;
    while hart.status() == Status::Running && count < limit {
        hart.tick();
        count += 1;
    }
    count
}

#[test]
fn immediate_load() {
    // addi x11, x0, 5
    let mut hart = Hart::new();
    hart.load_image(&0x0050_0593u32.to_le_bytes());
    hart.tick();
    assert_eq!(hart.x(11), 5);
    assert_eq!(hart.pc(), 1);
    assert_eq!(hart.status(), Status::Running);
}

#[test]
fn self_loop_halt() {
    // jal x0, 0
    let mut hart = Hart::new();
    hart.load_image(&0x0000_006fu32.to_le_bytes());
    hart.tick();
    assert_eq!(hart.status(), Status::Ended);
    assert_eq!(hart.pc(), 0);
    for n in 1..32 {
        assert_eq!(hart.x(n), 0);
    }
}

#[test]
fn illegal_opcode() {
    // fence
    let mut hart = Hart::new();
    hart.load_image(&0x0000_000fu32.to_le_bytes());
    hart.tick();
    assert_eq!(hart.status(), Status::Faulted(Fault::IllegalInstruction));
}

#[test]
fn bounds_fault_on_load() -> Result<(), &'static str> {
    let mut hart = hart_with_program(&[lui!(x5, 0xffff0), lw!(x6, x5, 0)]);
    hart.tick();
    hart.tick();
    assert_eq!(hart.status(), Status::Faulted(Fault::OutOfBounds));
    assert_eq!(hart.x(5), 0xffff_0000);
    assert_eq!(hart.x(6), 0);
    Ok(())
}

#[test]
fn counted_loop() -> Result<(), &'static str> {
    let mut hart = hart_with_program(&[
        addi!(x11, x0, 10),
        addi!(x10, x10, 1),
        blt!(x10, x11, -4),
        jal!(x0, 0),
    ]);
    let count = run_to_completion(&mut hart, 1000);
    assert_eq!(hart.status(), Status::Ended);
    assert_eq!(hart.x(10), 10);
    assert_eq!(hart.pc(), 3);
    // One setup instruction, ten increment/branch pairs, one halt
    assert_eq!(count, 22);
    Ok(())
}

#[test]
fn signed_division_edge() -> Result<(), &'static str> {
    let mut hart = hart_with_program(&[
        lui!(x5, 0x80000),
        addi!(x6, x0, -1),
        div!(x7, x5, x6),
        rem!(x8, x5, x6),
        jal!(x0, 0),
    ]);
    run_to_completion(&mut hart, 10);
    assert_eq!(hart.status(), Status::Ended);
    assert_eq!(hart.x(7), 0x8000_0000);
    assert_eq!(hart.x(8), 0);
    Ok(())
}

/// Division laws over a grid of interesting operands, checked on the
/// hart itself rather than on the bare arithmetic helpers
#[test]
fn division_identity_grid() -> Result<(), &'static str> {
    let operands: [i32; 8] = [0, 1, -1, 2, -7, 100, i32::MAX, i32::MIN];
    for (a, b) in iproduct!(operands, operands) {
        let mut hart = hart_with_program(&[
            div!(x3, x1, x2),
            rem!(x4, x1, x2),
            mul!(x5, x3, x2),
            add!(x6, x5, x4),
            jal!(x0, 0),
        ]);
        hart.set_x(1, a as u32);
        hart.set_x(2, b as u32);
        run_to_completion(&mut hart, 10);
        assert_eq!(hart.status(), Status::Ended);
        if b == 0 {
            // Architecturally defined results, not a fault
            assert_eq!(hart.x(3), 0xffff_ffff);
            assert_eq!(hart.x(4), a as u32);
        }
        // (a / b) * b + (a % b) == a in all cases, including the
        // division-by-zero and overflow edges
        assert_eq!(hart.x(6), a as u32, "a={a} b={b}");
    }
    Ok(())
}

#[test]
fn shipped_count_image_runs() {
    let image = include_bytes!("count.bin");
    let mut hart = Hart::new();
    assert_eq!(hart.load_image(image), image.len());
    let count = run_to_completion(&mut hart, 1000);
    assert_eq!(hart.status(), Status::Ended);
    assert_eq!(hart.x(10), 10);
    assert_eq!(hart.x(11), 10);
    assert_eq!(count, 22);
}
