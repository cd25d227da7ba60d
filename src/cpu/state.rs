#![doc = r#"
state - the CPU's architectural register/flag state plus the scratch
fields the micro-op pipeline shares across one instruction (spec §3).

`CpuState` is the single aggregate the façade owns (and the host may
swap, per §3 "Lifecycle"): registers, packed status flags, the
halt/run `Status`, the latched `PendingInterrupt`, the current
instruction's pipeline slot, and the small per-instruction scratch the
micro-ops read and write as they run.

Design notes mirror the teacher's `state.rs`: small, inlinable,
side-effect-isolated accessors; public setters that don't mask bits
(higher layers enforce invariants); flag helpers split into atomic
operations (`set_flag`, `clear_flag`, `assign_flag`) plus a composite
(`update_zn`).
"#]

use crate::bus::Bus;
use crate::cpu::interrupt::InterruptKind;
use crate::cpu::micro_op::MicroOpSeq;
use crate::cpu::opcode::{AddressMode, OperationKind};
use crate::cpu::operations::Operation;

/// Processor status flag bit masks (packed into `P`, spec §3).
pub const CARRY: u8 = 0b0000_0001;
pub const ZERO: u8 = 0b0000_0010;
pub const IRQ_DISABLE: u8 = 0b0000_0100;
pub const DECIMAL: u8 = 0b0000_1000;
pub const BREAK: u8 = 0b0001_0000;
pub const UNUSED: u8 = 0b0010_0000;
pub const OVERFLOW: u8 = 0b0100_0000;
pub const NEGATIVE: u8 = 0b1000_0000;

/// Halt/run mode (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Stopped,
    Jammed,
    Waiting,
    Bypassed,
}

/// Highest latched pending interrupt, strict priority Reset > Nmi > Irq
/// (spec §3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInterrupt {
    None,
    Irq,
    Nmi,
    Reset,
}

impl PendingInterrupt {
    /// Numeric priority; higher displaces lower, never the reverse.
    fn priority(self) -> u8 {
        match self {
            PendingInterrupt::None => 0,
            PendingInterrupt::Irq => 1,
            PendingInterrupt::Nmi => 2,
            PendingInterrupt::Reset => 3,
        }
    }
}

/// Which index register an addressing-mode step indexes by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexReg {
    X,
    Y,
}

/// Full architectural + pipeline-control state for one CPU instance.
#[derive(Clone)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub p: u8,

    pub status: Status,
    pub pending: PendingInterrupt,

    pub current_opcode: u8,
    pub opcode_address: u16,

    pub pipeline: MicroOpSeq,
    pub pipeline_index: usize,
    pub instruction_complete: bool,

    pub temp_address: u16,
    pub temp_value: u16,

    pub ignore_halt_stop_wait: bool,

    // --- per-instruction scratch (design notes §9 allow a small
    // per-instruction scratch struct threaded through dispatch; these
    // live on the state aggregate the way TempAddress/TempValue do) ---
    pub(crate) page_crossed: bool,
    pub(crate) branch_condition_met: bool,
    pub(crate) vector_address: u16,
    pub(crate) scratch_lo: u8,
    pub(crate) current_operation: Operation,
    pub(crate) current_mode: AddressMode,
    pub(crate) current_kind: OperationKind,
    pub(crate) active_interrupt: Option<InterruptKind>,
}

impl CpuState {
    /// Power-up-shaped defaults. Not itself a legal starting point for
    /// observable execution; `reset` is (spec §3 "Lifecycle").
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0,
            pc: 0,
            p: UNUSED | IRQ_DISABLE,
            status: Status::Running,
            pending: PendingInterrupt::None,
            current_opcode: 0,
            opcode_address: 0,
            pipeline: MicroOpSeq::new(),
            pipeline_index: 0,
            instruction_complete: true,
            temp_address: 0,
            temp_value: 0,
            ignore_halt_stop_wait: false,
            page_crossed: false,
            branch_condition_met: false,
            vector_address: 0,
            scratch_lo: 0,
            current_operation: Operation::Nop,
            current_mode: AddressMode::Implied,
            current_kind: OperationKind::Implied,
            active_interrupt: None,
        }
    }

    /// Immediate reset: zero A/X/Y, SP=$FD, P=U|I, fetch PC from the
    /// reset vector, clear the pipeline, return to Running (spec §3, §4.5).
    pub fn reset(&mut self, bus: &mut dyn Bus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.p = UNUSED | IRQ_DISABLE;
        self.status = Status::Running;
        self.pending = PendingInterrupt::None;
        self.current_opcode = 0;
        self.opcode_address = 0;
        self.pipeline = MicroOpSeq::new();
        self.pipeline_index = 0;
        self.instruction_complete = true;
        self.temp_address = 0;
        self.temp_value = 0;
        self.pc = bus.read_word(crate::bus::RESET_VECTOR);
    }

    /// Latch a pending interrupt under the strict-priority rule: a
    /// lower-priority signal never displaces a higher-priority one that
    /// is already pending (spec §3, §4.5).
    pub fn latch_interrupt(&mut self, kind: PendingInterrupt) {
        if kind.priority() >= self.pending.priority() {
            self.pending = kind;
        }
    }

    /// Remove a pending IRQ only; a pending NMI or Reset is untouched
    /// (spec §4.5 "clear_irq").
    pub fn clear_irq(&mut self) {
        if self.pending == PendingInterrupt::Irq {
            self.pending = PendingInterrupt::None;
        }
    }

    // ---------------- flags ----------------

    #[inline]
    pub fn flag(&self, mask: u8) -> bool {
        (self.p & mask) != 0
    }

    #[inline]
    pub fn set_flag(&mut self, mask: u8) {
        self.p |= mask;
    }

    #[inline]
    pub fn clear_flag(&mut self, mask: u8) {
        self.p &= !mask;
    }

    #[inline]
    pub fn assign_flag(&mut self, mask: u8, value: bool) {
        if value {
            self.set_flag(mask);
        } else {
            self.clear_flag(mask);
        }
    }

    /// Composite ZERO/NEGATIVE update shared by nearly every operation.
    #[inline]
    pub fn update_zn(&mut self, result: u8) {
        self.assign_flag(ZERO, result == 0);
        self.assign_flag(NEGATIVE, (result & 0x80) != 0);
    }

    /// Compose the status byte as it is pushed to the stack: U forced
    /// to 1, B set only for the caller-requested push kind (spec §3,
    /// §4.5 BRK vs hardware IRQ/NMI).
    #[inline]
    pub fn compose_status_for_push(&self, break_flag: bool) -> u8 {
        let mut v = self.p | UNUSED;
        if break_flag {
            v |= BREAK;
        } else {
            v &= !BREAK;
        }
        v
    }

    /// Apply a status byte pulled from the stack (PLP/RTI): U is always
    /// observed as 1; B is not a real flag bit once pulled back in.
    #[inline]
    pub fn apply_pulled_status(&mut self, value: u8) {
        self.p = (value | UNUSED) & !BREAK;
    }

    // ---------------- stack ----------------
    // Page $01 only; SP wraps within 8 bits (spec §3).

    #[inline]
    pub fn push_u8(&mut self, bus: &mut dyn Bus, value: u8) {
        bus.write(0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    #[inline]
    pub fn pull_u8(&mut self, bus: &mut dyn Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | self.sp as u16)
    }
}

impl Default for CpuState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ram_bus::RamBus;

    #[test]
    fn reset_sets_documented_defaults() {
        let mut bus = RamBus::new();
        bus.set_reset_vector(0xC123);
        let mut s = CpuState::new();
        s.reset(&mut bus);
        assert_eq!(s.a, 0);
        assert_eq!(s.x, 0);
        assert_eq!(s.y, 0);
        assert_eq!(s.sp, 0xFD);
        assert!(s.flag(IRQ_DISABLE));
        assert!(s.flag(UNUSED));
        assert_eq!(s.pc, 0xC123);
        assert!(matches!(s.status, Status::Running));
    }

    #[test]
    fn interrupt_priority_never_downgrades() {
        let mut s = CpuState::new();
        s.latch_interrupt(PendingInterrupt::Irq);
        assert_eq!(s.pending, PendingInterrupt::Irq);
        s.latch_interrupt(PendingInterrupt::Nmi);
        assert_eq!(s.pending, PendingInterrupt::Nmi);
        // A lower-priority signal must not displace NMI.
        s.latch_interrupt(PendingInterrupt::Irq);
        assert_eq!(s.pending, PendingInterrupt::Nmi);
        s.latch_interrupt(PendingInterrupt::Reset);
        assert_eq!(s.pending, PendingInterrupt::Reset);
    }

    #[test]
    fn clear_irq_only_clears_irq() {
        let mut s = CpuState::new();
        s.latch_interrupt(PendingInterrupt::Nmi);
        s.clear_irq();
        assert_eq!(s.pending, PendingInterrupt::Nmi);

        let mut s2 = CpuState::new();
        s2.latch_interrupt(PendingInterrupt::Irq);
        s2.clear_irq();
        assert_eq!(s2.pending, PendingInterrupt::None);
    }

    #[test]
    fn push_pull_round_trip_preserves_sp() {
        let mut bus = RamBus::new();
        let mut s = CpuState::new();
        s.sp = 0xFD;
        let original = s.sp;
        s.push_u8(&mut bus, 0xAB);
        s.push_u8(&mut bus, 0xCD);
        let v1 = s.pull_u8(&mut bus);
        let v0 = s.pull_u8(&mut bus);
        assert_eq!(v1, 0xCD);
        assert_eq!(v0, 0xAB);
        assert_eq!(s.sp, original);
    }

    #[test]
    fn status_push_pull_masks_break_and_unused() {
        let mut s = CpuState::new();
        s.p = 0x00;
        let pushed_brk = s.compose_status_for_push(true);
        assert_eq!(pushed_brk & BREAK, BREAK);
        assert_eq!(pushed_brk & UNUSED, UNUSED);

        let pushed_irq = s.compose_status_for_push(false);
        assert_eq!(pushed_irq & BREAK, 0);
        assert_eq!(pushed_irq & UNUSED, UNUSED);

        s.apply_pulled_status(0xFF);
        assert_eq!(s.p & BREAK, 0);
        assert_eq!(s.p & UNUSED, UNUSED);
    }
}
