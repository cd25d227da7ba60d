#![doc = r#"
addressing - translates an `AddressMode` into the micro-op prefix that
computes the effective address (or, for Immediate/Implied, into no
prefix at all), matching real bus-cycle counts including the
conditional page-cross fix-up (spec §4.3, §4.4).

`cpu::pipeline` appends an operation-kind-specific tail after this
prefix; this module only knows about address formation.
"#]

use crate::cpu::micro_op::{MicroOp, MicroOpSeq};
use crate::cpu::opcode::{AddressMode, OperationKind};
use crate::cpu::state::IndexReg;

/// Append the micro-ops that compute the effective address for `mode`,
/// given how the resulting operand will be used (`kind` distinguishes
/// read-form, whose indexed-page-cross cycle is conditional, from
/// store/RMW, whose indexed-page-cross cycle is unconditional).
///
/// Returns `true` if this mode produces an effective memory address at
/// all (false for `Implied`/`Accumulator`, which have no address and
/// whose single idle/execute cycle is appended by `cpu::pipeline`).
pub fn append_prefix(seq: &mut MicroOpSeq, mode: AddressMode, kind: OperationKind) -> bool {
    use AddressMode::*;
    match mode {
        Implied | Accumulator => false,
        Immediate => unreachable!(
            "Immediate addressing folds its fetch and execute into one cycle; \
             callers special-case it before reaching append_prefix"
        ),
        ZeroPage => {
            seq.push(MicroOp::FetchZpAddress);
            true
        }
        ZeroPageX => {
            seq.push(MicroOp::FetchZpAddress);
            seq.push(MicroOp::ZpIndexDummyRead(IndexReg::X));
            true
        }
        ZeroPageY => {
            seq.push(MicroOp::FetchZpAddress);
            seq.push(MicroOp::ZpIndexDummyRead(IndexReg::Y));
            true
        }
        Absolute => {
            seq.push(MicroOp::FetchAbsLow);
            seq.push(MicroOp::FetchAbsHigh { index: None });
            true
        }
        AbsoluteX => {
            seq.push(MicroOp::FetchAbsLow);
            seq.push(MicroOp::FetchAbsHigh {
                index: Some(IndexReg::X),
            });
            push_indexed_fixup(seq, kind);
            true
        }
        AbsoluteY => {
            seq.push(MicroOp::FetchAbsLow);
            seq.push(MicroOp::FetchAbsHigh {
                index: Some(IndexReg::Y),
            });
            push_indexed_fixup(seq, kind);
            true
        }
        IndirectX => {
            seq.push(MicroOp::FetchZpAddress);
            seq.push(MicroOp::ZpIndexDummyRead(IndexReg::X));
            seq.push(MicroOp::FetchPointerLow);
            seq.push(MicroOp::FetchPointerHigh { index_after: None });
            true
        }
        IndirectY => {
            seq.push(MicroOp::FetchZpAddress);
            seq.push(MicroOp::FetchPointerLow);
            seq.push(MicroOp::FetchPointerHigh {
                index_after: Some(IndexReg::Y),
            });
            push_indexed_fixup(seq, kind);
            true
        }
        IndirectZp => {
            seq.push(MicroOp::FetchZpAddress);
            seq.push(MicroOp::FetchPointerLow);
            seq.push(MicroOp::FetchPointerHigh { index_after: None });
            true
        }
        Indirect | AbsoluteIndexedIndirect | Relative | ZpRelative => {
            unreachable!("mode {mode:?} is built by its own kind-specific pipeline, not append_prefix")
        }
    }
}

/// Push the page-cross fix-up cycle. For read-form operations this is
/// provisional: `cpu::pipeline` removes it once the actual indexed
/// address is known and no crossing occurred. For store/RMW it is
/// unconditional (real hardware always spends it, since the effective
/// address must be stable before the write/RMW cycles run).
fn push_indexed_fixup(seq: &mut MicroOpSeq, kind: OperationKind) {
    match kind {
        OperationKind::Store | OperationKind::ReadModifyWrite => {
            seq.push(MicroOp::PageCrossFixup);
        }
        _ => {
            // Read-form: scheduled provisionally; `cpu::pipeline`
            // removes it at the point the address is resolved if the
            // page didn't actually change.
            seq.push(MicroOp::PageCrossFixup);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_prefix_is_one_cycle() {
        let mut seq = MicroOpSeq::new();
        let has_addr = append_prefix(&mut seq, AddressMode::ZeroPage, OperationKind::Read);
        assert!(has_addr);
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn absolute_indexed_read_form_schedules_provisional_fixup() {
        let mut seq = MicroOpSeq::new();
        append_prefix(&mut seq, AddressMode::AbsoluteX, OperationKind::Read);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.get(2), Some(MicroOp::PageCrossFixup));
    }

    #[test]
    fn indirect_x_has_no_index_after_pointer_fetch() {
        let mut seq = MicroOpSeq::new();
        append_prefix(&mut seq, AddressMode::IndirectX, OperationKind::Read);
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn implied_produces_no_prefix() {
        let mut seq = MicroOpSeq::new();
        let has_addr = append_prefix(&mut seq, AddressMode::Implied, OperationKind::Implied);
        assert!(!has_addr);
        assert_eq!(seq.len(), 0);
    }
}
