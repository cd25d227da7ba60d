#![doc = r#"
pipeline - composes an `OpcodeInfo` into the complete `MicroOpSeq` for
one instruction, including the opcode fetch itself (spec §4.3).

This is where addressing-mode prefixes (`cpu::addressing`) meet
operation-kind tails: read-form appends one execute cycle, store-form
appends a write cycle, read-modify-write appends the variant-correct
NMOS/CMOS RMW choreography, and each control-flow kind builds its own
fixed shape (JSR, RTS, RTI, BRK, branches, stack ops, JMP variants,
WAI/STP, JAM).
"#]

use crate::cpu::micro_op::{MicroOp, MicroOpSeq};
use crate::cpu::opcode::{AddressMode, OpcodeInfo, OperationKind};
use crate::variant::Variant;

/// Build the full pipeline for `info`, including the leading
/// `FetchOpcode` cycle every instruction shares.
pub fn build(info: OpcodeInfo, variant: Variant) -> MicroOpSeq {
    let mut seq = MicroOpSeq::new();
    seq.push(MicroOp::FetchOpcode);

    match info.kind {
        OperationKind::Implied => build_implied(&mut seq, info),
        OperationKind::Read => build_read(&mut seq, info),
        OperationKind::Store => build_store(&mut seq, info),
        OperationKind::ReadModifyWrite => build_rmw(&mut seq, info, variant),
        OperationKind::Branch => build_branch(&mut seq, info),
        OperationKind::ZpBranch => build_zp_branch(&mut seq),
        OperationKind::Jsr => build_jsr(&mut seq),
        OperationKind::Rts => build_rts(&mut seq),
        OperationKind::Rti => build_rti(&mut seq),
        OperationKind::Brk => build_brk(&mut seq),
        OperationKind::JmpAbsolute => build_jmp_absolute(&mut seq, info),
        OperationKind::JmpIndirect => build_jmp_indirect(&mut seq, info, variant),
        OperationKind::Pha | OperationKind::Php => build_push(&mut seq),
        OperationKind::Pla | OperationKind::Plp => build_pull(&mut seq),
        OperationKind::Halt => build_halt(&mut seq),
        OperationKind::Jam => {
            // A single fetch cycle; the engine holds the CPU at this PC
            // (Status::Jammed) rather than advancing further (spec §4.4).
        }
    }

    seq
}

fn build_implied(seq: &mut MicroOpSeq, info: OpcodeInfo) {
    match info.mode {
        AddressMode::Implied | AddressMode::Accumulator => {
            seq.push(MicroOp::ImpliedOrAccumulatorExecute);
        }
        _ => unreachable!("Implied operation kind with non-implied mode {:?}", info.mode),
    }
}

fn build_read(seq: &mut MicroOpSeq, info: OpcodeInfo) {
    // Immediate mode has no separate address-formation cycle: the byte
    // at PC is both fetched and applied in the same cycle.
    if info.mode != AddressMode::Immediate {
        crate::cpu::addressing::append_prefix(seq, info.mode, info.kind);
    }
    seq.push(MicroOp::ReadEffectiveAndExecute);
}

fn build_store(seq: &mut MicroOpSeq, info: OpcodeInfo) {
    crate::cpu::addressing::append_prefix(seq, info.mode, info.kind);
    seq.push(MicroOp::ComputeAndWriteEffective);
}

fn build_rmw(seq: &mut MicroOpSeq, info: OpcodeInfo, variant: Variant) {
    if info.mode == AddressMode::Accumulator {
        seq.push(MicroOp::ImpliedOrAccumulatorExecute);
        return;
    }
    crate::cpu::addressing::append_prefix(seq, info.mode, info.kind);
    seq.push(MicroOp::ReadEffectiveAndExecute);
    if variant.is_nmos() {
        seq.push(MicroOp::RmwDummyWriteOld);
    } else {
        seq.push(MicroOp::RmwDummyReadSame);
    }
    seq.push(MicroOp::RmwComputeAndWrite);
}

fn build_branch(seq: &mut MicroOpSeq, _info: OpcodeInfo) {
    seq.push(MicroOp::BranchFetchOffsetAndDecide);
    seq.push(MicroOp::BranchApplyLow);
    seq.push(MicroOp::BranchApplyPageFix);
}

fn build_zp_branch(seq: &mut MicroOpSeq) {
    // Rockwell BBR/BBS: fetch zero-page operand, read it, then behave
    // like a branch on the tested bit (spec.md supplement; grounded in
    // the documented 5-cycle-not-taken/6-cycle-not-crossing/7-cycle-
    // crossing Rockwell timing).
    seq.push(MicroOp::FetchZpAddress);
    seq.push(MicroOp::ReadEffectiveAndExecute);
    seq.push(MicroOp::BranchFetchOffsetAndDecide);
    seq.push(MicroOp::BranchApplyLow);
    seq.push(MicroOp::BranchApplyPageFix);
}

fn build_jsr(seq: &mut MicroOpSeq) {
    seq.push(MicroOp::FetchAbsLow);
    seq.push(MicroOp::InternalIdle);
    seq.push(MicroOp::PushPch);
    seq.push(MicroOp::PushPcl);
    // The engine applies PC from the combined operand in this same
    // cycle (current_kind == Jsr), matching real JSR's 6-cycle shape.
    seq.push(MicroOp::FetchAbsHigh { index: None });
}

fn build_rts(seq: &mut MicroOpSeq) {
    seq.push(MicroOp::InternalIdle);
    seq.push(MicroOp::PullPcl);
    seq.push(MicroOp::PullPch);
    seq.push(MicroOp::InternalIdle);
}

fn build_rti(seq: &mut MicroOpSeq) {
    seq.push(MicroOp::InternalIdle);
    seq.push(MicroOp::PullStatus);
    seq.push(MicroOp::PullPcl);
    seq.push(MicroOp::PullPch);
}

fn build_brk(seq: &mut MicroOpSeq) {
    seq.push(MicroOp::FetchOperandByte); // signature/padding byte, discarded
    seq.push(MicroOp::PushPch);
    seq.push(MicroOp::PushPcl);
    seq.push(MicroOp::PushStatusForInterrupt);
    seq.push(MicroOp::VectorFetchLow);
    seq.push(MicroOp::VectorFetchHigh);
}

fn build_jmp_absolute(seq: &mut MicroOpSeq, _info: OpcodeInfo) {
    seq.push(MicroOp::FetchAbsLow);
    // The engine applies PC directly from this fetch (current_kind ==
    // JmpAbsolute); no separate register-transfer cycle exists on
    // real hardware.
    seq.push(MicroOp::FetchAbsHigh { index: None });
}

fn build_jmp_indirect(seq: &mut MicroOpSeq, info: OpcodeInfo, variant: Variant) {
    match info.mode {
        AddressMode::Indirect => {
            seq.push(MicroOp::FetchAbsLow);
            seq.push(MicroOp::FetchAbsHigh { index: None });
            if !variant.has_jmp_indirect_bug() {
                // CMOS spends one extra internal cycle so the pointer's
                // high byte can be fetched from the correctly
                // incremented address instead of wrapping within the
                // page the way NMOS silicon does (the classic JMP
                // ($xxFF) bug, reproduced by `cpu::engine` consulting
                // the variant when it executes `FetchPointerHigh`).
                seq.push(MicroOp::InternalIdle);
            }
            seq.push(MicroOp::FetchPointerLow);
            // The engine applies PC directly from this fetch
            // (current_kind == JmpIndirect).
            seq.push(MicroOp::FetchPointerHigh { index_after: None });
        }
        AddressMode::AbsoluteIndexedIndirect => {
            seq.push(MicroOp::FetchAbsLow);
            seq.push(MicroOp::FetchAbsHigh { index: None });
            seq.push(MicroOp::InternalIdle);
            seq.push(MicroOp::FetchPointerLow);
            seq.push(MicroOp::FetchPointerHigh { index_after: None });
        }
        _ => unreachable!("JmpIndirect kind with mode {:?}", info.mode),
    }
}

fn build_push(seq: &mut MicroOpSeq) {
    seq.push(MicroOp::InternalIdle);
    seq.push(MicroOp::PushByte); // engine dispatch distinguishes PHA/PHP/PHX/PHY by Operation
}

fn build_pull(seq: &mut MicroOpSeq) {
    seq.push(MicroOp::InternalIdle);
    seq.push(MicroOp::InternalIdle);
    seq.push(MicroOp::PullByte); // engine dispatch distinguishes PLA/PLP/PLX/PLY by Operation
}

fn build_halt(seq: &mut MicroOpSeq) {
    seq.push(MicroOp::InternalIdle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::opcode::VariantDescriptor;

    #[test]
    fn lda_immediate_is_two_cycles() {
        let d = VariantDescriptor::new(Variant::NmosFull);
        let info = d.decode(0xA9);
        let seq = build(info, Variant::NmosFull);
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn lda_absolute_x_is_five_cycles_before_fixup_removed() {
        let d = VariantDescriptor::new(Variant::NmosFull);
        let info = d.decode(0xBD);
        let seq = build(info, Variant::NmosFull);
        // fetch + abslow + abshigh + provisional fixup + execute; the
        // engine removes the fixup at runtime when no page was crossed.
        assert_eq!(seq.len(), 5);
    }

    #[test]
    fn sta_absolute_x_is_five_cycles_unconditionally() {
        let d = VariantDescriptor::new(Variant::NmosFull);
        let info = d.decode(0x9D);
        let seq = build(info, Variant::NmosFull);
        assert_eq!(seq.len(), 5);
    }

    #[test]
    fn nmos_rmw_uses_dummy_write_old() {
        let d = VariantDescriptor::new(Variant::NmosFull);
        let info = d.decode(0xE6); // INC zp
        let seq = build(info, Variant::NmosFull);
        assert!(seq
            .get(3)
            .map(|op| op == MicroOp::RmwDummyWriteOld)
            .unwrap_or(false));
    }

    #[test]
    fn cmos_rmw_uses_dummy_read_same() {
        let d = VariantDescriptor::new(Variant::Wdc65C02);
        let info = d.decode(0xE6);
        let seq = build(info, Variant::Wdc65C02);
        assert!(seq
            .get(3)
            .map(|op| op == MicroOp::RmwDummyReadSame)
            .unwrap_or(false));
    }

    #[test]
    fn brk_is_seven_cycles() {
        let d = VariantDescriptor::new(Variant::NmosFull);
        let info = d.decode(0x00);
        let seq = build(info, Variant::NmosFull);
        assert_eq!(seq.len(), 7);
    }

    #[test]
    fn jsr_is_six_cycles() {
        let d = VariantDescriptor::new(Variant::NmosFull);
        let info = d.decode(0x20);
        let seq = build(info, Variant::NmosFull);
        assert_eq!(seq.len(), 6);
    }
}
