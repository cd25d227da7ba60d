#![doc = r#"
operations - what each opcode does to registers/flags/memory, decoupled
from how many cycles it takes or how its operand address was formed
(spec §4.4). `cpu::opcode` pairs an `Operation` with an addressing mode
and an `OperationKind` (read/store/rmw/implied/branch/...) to build a
pipeline; this module only knows how to apply the operation once an
operand is in hand.

Variants cover the full documented set for NMOS and 65C02 (WDC +
Rockwell), plus the NMOS undocumented opcodes this core reproduces
faithfully under `Variant::NmosFull` (spec §4.4 "Undocumented opcodes").
`Variant::NmosSimple` reuses the same table but maps every undocumented
slot's `Operation` to `Nop` of the matching addressing-mode timing
before it ever reaches here (see `cpu::opcode`), so this module never
has to know which variant it's serving for anything but ADC/SBC/BCD
(handled in `cpu::alu`) and the D-clear-on-interrupt policy (handled in
`cpu::interrupt`).
"#]

use crate::cpu::alu;
use crate::cpu::opcode::AddressMode;
use crate::cpu::state::{CpuState, CARRY, DECIMAL, NEGATIVE, OVERFLOW, ZERO};
use crate::variant::Variant;

/// Branch condition, spec §4.4 "Branches".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    CarryClear,
    CarrySet,
    NotEqual,
    Equal,
    Plus,
    Minus,
    OverflowClear,
    OverflowSet,
    Always,
}

impl Condition {
    pub fn is_met(self, state: &CpuState) -> bool {
        match self {
            Condition::CarryClear => !state.flag(CARRY),
            Condition::CarrySet => state.flag(CARRY),
            Condition::NotEqual => !state.flag(ZERO),
            Condition::Equal => state.flag(ZERO),
            Condition::Plus => !state.flag(NEGATIVE),
            Condition::Minus => state.flag(NEGATIVE),
            Condition::OverflowClear => !state.flag(OVERFLOW),
            Condition::OverflowSet => state.flag(OVERFLOW),
            Condition::Always => true,
        }
    }
}

/// What an opcode does, independent of addressing mode and cycle count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    // Loads / stores (read-form and store-form, dispatched by OperationKind)
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    Stz, // 65C02

    // Register transfers / implied
    Tax,
    Tay,
    Txa,
    Tya,
    Tsx,
    Txs,
    Dex,
    Dey,
    Inx,
    Iny,
    Nop,

    // Stack
    Pha,
    Php,
    Pla,
    Plp,
    Phx, // 65C02
    Phy, // 65C02
    Plx, // 65C02
    Ply, // 65C02

    // Logical / arithmetic read-form
    And,
    Ora,
    Eor,
    Bit,
    Adc,
    Sbc,
    Cmp,
    Cpx,
    Cpy,

    // Read-modify-write
    Inc,
    Dec,
    Asl,
    Lsr,
    Rol,
    Ror,
    Trb, // 65C02, RMW-like but flag-only-on-test semantics
    Tsb, // 65C02

    // Control flow
    JmpAbsolute,
    JmpIndirect,
    Jsr,
    Rts,
    Rti,
    Brk,
    Branch(Condition),
    BraAlways, // 65C02 unconditional BRA, same shape as Branch(Always)

    // Flag ops
    Clc,
    Sec,
    Cli,
    Sei,
    Clv,
    Cld,
    Sed,

    // WDC halt states
    Wai,
    Stp,

    // Rockwell bit ops: `nth` selects bit 0..=7
    Rmb(u8),
    Smb(u8),
    Bbr(u8),
    Bbs(u8),

    // NMOS undocumented (executed verbatim under NmosFull; mapped to
    // Nop of matching timing under NmosSimple before reaching here)
    Lax,
    Sax,
    Dcp,
    Isb,
    Slo,
    Rla,
    Sre,
    Rra,
    Anc,
    Alr,
    Arr,
    Sbx,
    Las,
    /// Halts the CPU (`Status::Jammed`) until reset. NMOS-only opcode slots.
    Jam,
}

/// Apply a read-form operation (operand already fetched) to `state`.
/// Covers everything whose effect is "read a byte, update A/flags,
/// nothing is written back" plus the two-operand compares.
///
/// `mode` is only consulted by `Bit`: the CMOS-only immediate form
/// (0x89) sets Z from `A & value` but leaves N/V untouched, unlike
/// every other BIT addressing mode (spec §4.4 "BIT").
pub fn apply_read(state: &mut CpuState, variant: Variant, op: Operation, mode: AddressMode, value: u8) {
    match op {
        Operation::Lda => {
            state.a = value;
            state.update_zn(value);
        }
        Operation::Ldx => {
            state.x = value;
            state.update_zn(value);
        }
        Operation::Ldy => {
            state.y = value;
            state.update_zn(value);
        }
        Operation::And => {
            state.a &= value;
            state.update_zn(state.a);
        }
        Operation::Ora => {
            state.a |= value;
            state.update_zn(state.a);
        }
        Operation::Eor => {
            state.a ^= value;
            state.update_zn(state.a);
        }
        Operation::Bit => {
            let result = state.a & value;
            state.assign_flag(ZERO, result == 0);
            if mode != AddressMode::Immediate {
                state.assign_flag(NEGATIVE, (value & 0x80) != 0);
                state.assign_flag(OVERFLOW, (value & 0x40) != 0);
            }
        }
        Operation::Adc => {
            let r = alu::add_with_carry(state, variant, value);
            state.a = r.value;
            alu::apply_add_sub_flags(state, variant, &r);
        }
        Operation::Sbc => {
            let r = alu::sub_with_carry(state, variant, value);
            state.a = r.value;
            alu::apply_add_sub_flags(state, variant, &r);
        }
        Operation::Cmp => compare(state, state.a, value),
        Operation::Cpx => compare(state, state.x, value),
        Operation::Cpy => compare(state, state.y, value),
        Operation::Lax => {
            state.a = value;
            state.x = value;
            state.update_zn(value);
        }
        Operation::Las => {
            let result = value & state.sp;
            state.a = result;
            state.x = result;
            state.sp = result;
            state.update_zn(result);
        }
        Operation::Anc => {
            state.a &= value;
            state.update_zn(state.a);
            state.assign_flag(CARRY, (state.a & 0x80) != 0);
        }
        Operation::Alr => {
            state.a &= value;
            let carry_out = (state.a & 0x01) != 0;
            state.a >>= 1;
            state.assign_flag(CARRY, carry_out);
            state.update_zn(state.a);
        }
        Operation::Arr => {
            // AND then ROR, with BCD-sensitive flag quirks (NMOS only).
            state.a &= value;
            let carry_in = state.flag(CARRY);
            state.a = (state.a >> 1) | if carry_in { 0x80 } else { 0 };
            state.update_zn(state.a);
            let bit6 = (state.a & 0x40) != 0;
            let bit5 = (state.a & 0x20) != 0;
            state.assign_flag(CARRY, bit6);
            state.assign_flag(OVERFLOW, bit6 != bit5);
        }
        Operation::Sbx => {
            let result = (state.a & state.x).wrapping_sub(value);
            let borrow = (state.a & state.x) < value;
            state.x = result;
            state.update_zn(result);
            state.assign_flag(CARRY, !borrow);
        }
        _ => unreachable!("apply_read called with non-read-form operation {op:?}"),
    }
}

/// Apply a store-form operation, computing the byte to write without
/// mutating registers (STA/STX/STY/STZ, and the illegal SAX).
pub fn compute_store(state: &CpuState, op: Operation) -> u8 {
    match op {
        Operation::Sta => state.a,
        Operation::Stx => state.x,
        Operation::Sty => state.y,
        Operation::Stz => 0,
        Operation::Sax => state.a & state.x,
        _ => unreachable!("compute_store called with non-store operation {op:?}"),
    }
}

/// Apply an implied/accumulator-mode operation with no memory operand.
pub fn apply_implied(state: &mut CpuState, op: Operation) {
    match op {
        Operation::Tax => {
            state.x = state.a;
            state.update_zn(state.x);
        }
        Operation::Tay => {
            state.y = state.a;
            state.update_zn(state.y);
        }
        Operation::Txa => {
            state.a = state.x;
            state.update_zn(state.a);
        }
        Operation::Tya => {
            state.a = state.y;
            state.update_zn(state.a);
        }
        Operation::Tsx => {
            state.x = state.sp;
            state.update_zn(state.x);
        }
        Operation::Txs => {
            state.sp = state.x;
        }
        Operation::Dex => {
            state.x = state.x.wrapping_sub(1);
            state.update_zn(state.x);
        }
        Operation::Dey => {
            state.y = state.y.wrapping_sub(1);
            state.update_zn(state.y);
        }
        Operation::Inx => {
            state.x = state.x.wrapping_add(1);
            state.update_zn(state.x);
        }
        Operation::Iny => {
            state.y = state.y.wrapping_add(1);
            state.update_zn(state.y);
        }
        Operation::Clc => state.clear_flag(CARRY),
        Operation::Sec => state.set_flag(CARRY),
        Operation::Cli => state.clear_flag(crate::cpu::state::IRQ_DISABLE),
        Operation::Sei => state.set_flag(crate::cpu::state::IRQ_DISABLE),
        Operation::Clv => state.clear_flag(OVERFLOW),
        Operation::Cld => state.clear_flag(DECIMAL),
        Operation::Sed => state.set_flag(DECIMAL),
        Operation::Nop => {}
        Operation::Asl | Operation::Lsr | Operation::Rol | Operation::Ror => {
            rmw_accumulator(state, op)
        }
        _ => unreachable!("apply_implied called with non-implied operation {op:?}"),
    }
}

fn rmw_accumulator(state: &mut CpuState, op: Operation) {
    let (result, carry) = shift_or_rotate(op, state.a, state.flag(CARRY));
    state.a = result;
    state.assign_flag(CARRY, carry);
    state.update_zn(state.a);
}

/// Compute a read-modify-write result (ASL/LSR/ROL/ROR/INC/DEC and the
/// illegal combos SLO/RLA/SRE/RRA/DCP/ISB). Returns `(new_value,
/// extra_carry)`; `extra_carry` is `Some` only when the op sets CARRY
/// as a side effect distinct from N/Z (shift/rotate family and the
/// illegal combos that fold an ALU step on top of the shift).
pub fn apply_rmw(
    state: &mut CpuState,
    variant: Variant,
    op: Operation,
    value: u8,
) -> u8 {
    match op {
        Operation::Inc => {
            let r = value.wrapping_add(1);
            state.update_zn(r);
            r
        }
        Operation::Dec => {
            let r = value.wrapping_sub(1);
            state.update_zn(r);
            r
        }
        Operation::Asl | Operation::Lsr | Operation::Rol | Operation::Ror => {
            let (r, carry) = shift_or_rotate(op, value, state.flag(CARRY));
            state.assign_flag(CARRY, carry);
            state.update_zn(r);
            r
        }
        Operation::Slo => {
            let (shifted, carry) = shift_or_rotate(Operation::Asl, value, state.flag(CARRY));
            state.assign_flag(CARRY, carry);
            state.a |= shifted;
            state.update_zn(state.a);
            shifted
        }
        Operation::Rla => {
            let (rotated, carry) = shift_or_rotate(Operation::Rol, value, state.flag(CARRY));
            state.assign_flag(CARRY, carry);
            state.a &= rotated;
            state.update_zn(state.a);
            rotated
        }
        Operation::Sre => {
            let (shifted, carry) = shift_or_rotate(Operation::Lsr, value, state.flag(CARRY));
            state.assign_flag(CARRY, carry);
            state.a ^= shifted;
            state.update_zn(state.a);
            shifted
        }
        Operation::Rra => {
            let (rotated, carry) = shift_or_rotate(Operation::Ror, value, state.flag(CARRY));
            state.assign_flag(CARRY, carry);
            let r = alu::add_with_carry(state, variant, rotated);
            state.a = r.value;
            alu::apply_add_sub_flags(state, variant, &r);
            rotated
        }
        Operation::Dcp => {
            let r = value.wrapping_sub(1);
            compare(state, state.a, r);
            r
        }
        Operation::Isb => {
            let r = value.wrapping_add(1);
            let sub = alu::sub_with_carry(state, variant, r);
            state.a = sub.value;
            alu::apply_add_sub_flags(state, variant, &sub);
            r
        }
        Operation::Trb => {
            let r = value & !state.a;
            state.assign_flag(ZERO, (value & state.a) == 0);
            r
        }
        Operation::Tsb => {
            let r = value | state.a;
            state.assign_flag(ZERO, (value & state.a) == 0);
            r
        }
        Operation::Rmb(bit) => value & !(1u8 << bit),
        Operation::Smb(bit) => value | (1u8 << bit),
        _ => unreachable!("apply_rmw called with non-rmw operation {op:?}"),
    }
}

fn shift_or_rotate(op: Operation, value: u8, carry_in: bool) -> (u8, bool) {
    match op {
        Operation::Asl => ((value << 1), (value & 0x80) != 0),
        Operation::Lsr => ((value >> 1), (value & 0x01) != 0),
        Operation::Rol => {
            let carry_out = (value & 0x80) != 0;
            let r = (value << 1) | if carry_in { 1 } else { 0 };
            (r, carry_out)
        }
        Operation::Ror => {
            let carry_out = (value & 0x01) != 0;
            let r = (value >> 1) | if carry_in { 0x80 } else { 0 };
            (r, carry_out)
        }
        _ => unreachable!(),
    }
}

fn compare(state: &mut CpuState, reg: u8, value: u8) {
    let result = reg.wrapping_sub(value);
    state.assign_flag(CARRY, reg >= value);
    state.update_zn(result);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lda_sets_zero_and_negative() {
        let mut s = CpuState::new();
        apply_read(&mut s, Variant::NmosFull, Operation::Lda, AddressMode::Immediate, 0x00);
        assert!(s.flag(ZERO));
        apply_read(&mut s, Variant::NmosFull, Operation::Lda, AddressMode::Immediate, 0x80);
        assert!(s.flag(NEGATIVE));
    }

    #[test]
    fn bit_takes_nz_from_result_but_nv_from_operand() {
        let mut s = CpuState::new();
        s.a = 0x0F;
        apply_read(&mut s, Variant::NmosFull, Operation::Bit, AddressMode::ZeroPage, 0xC0);
        assert!(s.flag(ZERO));
        assert!(s.flag(NEGATIVE));
        assert!(s.flag(OVERFLOW));
    }

    #[test]
    fn bit_immediate_sets_only_zero() {
        let mut s = CpuState::new();
        s.a = 0x0F;
        s.set_flag(NEGATIVE);
        s.set_flag(OVERFLOW);
        apply_read(&mut s, Variant::NmosFull, Operation::Bit, AddressMode::Immediate, 0xC0);
        assert!(s.flag(ZERO));
        // N/V are left exactly as they were; BIT immediate never touches them.
        assert!(s.flag(NEGATIVE));
        assert!(s.flag(OVERFLOW));
        s.clear_flag(NEGATIVE);
        s.clear_flag(OVERFLOW);
        apply_read(&mut s, Variant::NmosFull, Operation::Bit, AddressMode::Immediate, 0xC0);
        assert!(!s.flag(NEGATIVE));
        assert!(!s.flag(OVERFLOW));
    }

    #[test]
    fn cmp_sets_carry_when_register_gte_operand() {
        let mut s = CpuState::new();
        s.a = 0x10;
        compare(&mut s, s.a, 0x10);
        assert!(s.flag(CARRY));
        assert!(s.flag(ZERO));
    }

    #[test]
    fn asl_memory_shifts_and_captures_carry() {
        let mut s = CpuState::new();
        let r = apply_rmw(&mut s, Variant::NmosFull, Operation::Asl, 0x81);
        assert_eq!(r, 0x02);
        assert!(s.flag(CARRY));
    }

    #[test]
    fn slo_shifts_and_ors_into_accumulator() {
        let mut s = CpuState::new();
        s.a = 0x01;
        let r = apply_rmw(&mut s, Variant::NmosFull, Operation::Slo, 0x80);
        assert_eq!(r, 0x00);
        assert!(s.flag(CARRY));
        assert_eq!(s.a, 0x01);
    }

    #[test]
    fn lax_loads_both_a_and_x() {
        let mut s = CpuState::new();
        apply_read(&mut s, Variant::NmosFull, Operation::Lax, AddressMode::Immediate, 0x42);
        assert_eq!(s.a, 0x42);
        assert_eq!(s.x, 0x42);
    }

    #[test]
    fn sax_stores_a_and_x_intersection() {
        let mut s = CpuState::new();
        s.a = 0xF0;
        s.x = 0x0F;
        assert_eq!(compute_store(&s, Operation::Sax), 0x00);
        s.x = 0xFF;
        assert_eq!(compute_store(&s, Operation::Sax), 0xF0);
    }

    #[test]
    fn rmb_smb_toggle_individual_bits() {
        let mut s = CpuState::new();
        assert_eq!(
            apply_rmw(&mut s, Variant::Rockwell65C02, Operation::Rmb(3), 0xFF),
            0b1111_0111
        );
        assert_eq!(
            apply_rmw(&mut s, Variant::Rockwell65C02, Operation::Smb(0), 0x00),
            0b0000_0001
        );
    }
}
