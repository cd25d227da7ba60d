#![doc = r#"
interrupt - builds the micro-op sequence that services a latched
Reset/NMI/IRQ, and the PC/status bookkeeping particular to each (spec
§4.5).

Hardware-serviced interrupts (IRQ, NMI) push status with the B flag
clear; software BRK pushes it set. Both push PC/status, set I, and
(CMOS only) clear D, then vector through the appropriate fixed address.
Reset does not use the pipeline at all: it is the one case with no
prior machine state to preserve, so `CpuState::reset` applies it
directly (see `cpu::engine`).
"#]

use crate::bus::{IRQ_VECTOR, NMI_VECTOR};
use crate::cpu::micro_op::{MicroOp, MicroOpSeq};

/// Which fixed vector an interrupt-service sequence reads PC from.
/// BRK and hardware IRQ share the same vector (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    Irq,
    Nmi,
    Brk,
}

impl InterruptKind {
    pub fn vector(self) -> u16 {
        match self {
            InterruptKind::Irq | InterruptKind::Brk => IRQ_VECTOR,
            InterruptKind::Nmi => NMI_VECTOR,
        }
    }

    /// Whether the pushed status byte has the B flag set (spec §4.5
    /// "BRK vs hardware IRQ/NMI").
    pub fn pushes_break_flag(self) -> bool {
        matches!(self, InterruptKind::Brk)
    }
}

/// Build the 7-cycle hardware-interrupt service sequence (IRQ/NMI).
/// BRK's own sequence lives in `cpu::pipeline::build` alongside the
/// other opcodes, since BRK is dispatched through ordinary opcode
/// fetch/decode rather than out-of-band like IRQ/NMI.
pub fn build_hardware_service(_kind: InterruptKind) -> MicroOpSeq {
    let mut seq = MicroOpSeq::new();
    // Two discarded opcode-fetch-shaped cycles, matching real silicon's
    // behavior of reading (and discarding) the instruction stream while
    // the interrupt sequencer takes over.
    seq.push(MicroOp::InternalIdle);
    seq.push(MicroOp::InternalIdle);
    seq.push(MicroOp::PushPch);
    seq.push(MicroOp::PushPcl);
    seq.push(MicroOp::PushStatusForInterrupt);
    seq.push(MicroOp::VectorFetchLow);
    seq.push(MicroOp::VectorFetchHigh);
    seq
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irq_and_brk_share_a_vector() {
        assert_eq!(InterruptKind::Irq.vector(), InterruptKind::Brk.vector());
        assert_ne!(InterruptKind::Irq.vector(), InterruptKind::Nmi.vector());
    }

    #[test]
    fn only_brk_sets_break_flag_on_push() {
        assert!(InterruptKind::Brk.pushes_break_flag());
        assert!(!InterruptKind::Irq.pushes_break_flag());
        assert!(!InterruptKind::Nmi.pushes_break_flag());
    }

    #[test]
    fn hardware_service_is_seven_cycles() {
        let seq = build_hardware_service(InterruptKind::Irq);
        assert_eq!(seq.len(), 7);
    }
}
