#![doc = r#"
engine - the per-cycle dispatch loop: `Cpu6502::clock` executes exactly
one micro-op (spec §4.3), and the instruction-boundary logic that
decides whether the next cycle starts a fresh opcode fetch or services
a latched interrupt (spec §4.5).

Design notes: a boundary is "is this instruction complete"
(`CpuState::instruction_complete`). At a boundary, `clock` first asks
whether Reset/NMI/IRQ should be serviced (strict priority, spec §3);
Reset is applied immediately and out-of-band (no prior machine state to
preserve). Otherwise it installs either the 7-cycle hardware-interrupt
pipeline or a fresh opcode-fetch pipeline and runs the first micro-op of
whichever it installed, so every `clock` call does exactly one cycle of
host-visible work, never zero and never more than one.
"#]

use crate::bus::Bus;
use crate::cpu::interrupt::{self, InterruptKind};
use crate::cpu::micro_op::MicroOp;
use crate::cpu::opcode::{AddressMode, OperationKind, VariantDescriptor};
use crate::cpu::operations::{self, Operation};
use crate::cpu::pipeline;
use crate::cpu::state::{CpuState, IndexReg, PendingInterrupt, Status, IRQ_DISABLE};
use crate::variant::Variant;

/// A cycle-accurate 6502-family CPU core (spec §4.6 "Façade").
pub struct Cpu6502 {
    pub(crate) state: CpuState,
    pub(crate) descriptor: VariantDescriptor,
}

impl Cpu6502 {
    /// Build a CPU for `variant`. The returned CPU is in the
    /// power-up-shaped state from `CpuState::new`; call `reset` before
    /// running it (spec §3 "Lifecycle").
    pub fn new(variant: Variant) -> Self {
        Self {
            state: CpuState::new(),
            descriptor: VariantDescriptor::new(variant),
        }
    }

    pub fn variant(&self) -> Variant {
        self.descriptor.variant
    }

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    /// Apply an immediate reset (spec §4.5).
    pub fn reset(&mut self, bus: &mut dyn Bus) {
        self.state.reset(bus);
    }

    /// Latch a maskable interrupt request. The request is serviced at
    /// the next instruction boundary where IRQ_DISABLE is clear, or
    /// immediately wakes a WAI-halted CPU (spec §4.5).
    pub fn signal_irq(&mut self) {
        self.state.latch_interrupt(PendingInterrupt::Irq);
    }

    /// Remove a pending IRQ (the external device deasserted its line
    /// before it was serviced). Does not affect a pending NMI or Reset.
    pub fn clear_irq(&mut self) {
        self.state.clear_irq();
    }

    /// Latch a non-maskable interrupt (edge-triggered; always serviced
    /// at the next boundary regardless of IRQ_DISABLE, spec §4.5).
    pub fn signal_nmi(&mut self) {
        self.state.latch_interrupt(PendingInterrupt::Nmi);
    }

    /// Latch a reset request to be serviced at the next boundary,
    /// distinct from calling `reset` directly (spec §3).
    pub fn signal_reset(&mut self) {
        self.state.latch_interrupt(PendingInterrupt::Reset);
    }

    /// Execute exactly one emulated clock cycle, returning whether an
    /// instruction boundary was reached this cycle — always `true` while
    /// halted, since a halted CPU re-reaches the boundary every cycle
    /// (spec §4.3, §4.6).
    pub fn clock(&mut self, bus: &mut dyn Bus) -> bool {
        if self.state.instruction_complete {
            self.handle_boundary(bus);
        } else {
            self.execute_current(bus);
        }
        self.state.instruction_complete
    }

    /// Run whole instructions until one completes, returning the cycle
    /// count spent (spec §4.6 "step"). A pathologically malformed
    /// opcode table could in principle never complete; the 100-cycle
    /// ceiling (spec §5, §7) turns that into a panic rather than a
    /// silent hang.
    pub fn step(&mut self, bus: &mut dyn Bus) -> u32 {
        let mut cycles = 0u32;
        loop {
            let boundary = self.clock(bus);
            cycles += 1;
            if boundary {
                return cycles;
            }
            assert!(
                cycles < 100,
                "instruction did not complete within 100 cycles; opcode table is malformed"
            );
        }
    }

    /// Run up to `max_cycles` emulated clock cycles (spec §4.6 "run"),
    /// ignoring instruction boundaries entirely — unlike `step`, this
    /// does not stop early at a boundary or on a halt status; it always
    /// spends exactly `max_cycles` clocks. Returns the number of cycles
    /// actually run.
    pub fn run(&mut self, bus: &mut dyn Bus, max_cycles: u32) -> u32 {
        for _ in 0..max_cycles {
            self.clock(bus);
        }
        max_cycles
    }

    /// Force-evaluate the pending interrupt at the current boundary
    /// without advancing a full cycle, primarily for test harnesses
    /// that want to assert on `Status`/`PendingInterrupt` immediately
    /// after a `signal_*` call (spec §9 "Bypassed" / testing hooks).
    /// Returns whether a Reset/NMI/IRQ was actually serviced; `false` if
    /// nothing was pending, the CPU was mid-instruction, or it is
    /// Jammed/Stopped with nothing but Reset able to revive it.
    pub fn handle_pending_interrupt(&mut self, bus: &mut dyn Bus) -> bool {
        if self.state.instruction_complete {
            self.handle_boundary(bus)
        } else {
            false
        }
    }

    fn should_service_nmi(&self) -> bool {
        self.state.pending == PendingInterrupt::Nmi
    }

    fn should_service_irq(&self) -> bool {
        self.state.pending == PendingInterrupt::Irq && !self.state.flag(IRQ_DISABLE)
    }

    /// Evaluate one instruction boundary: decide whether Reset/NMI/IRQ
    /// should be serviced, or whether a fresh opcode fetch starts.
    /// Returns whether servicing of a Reset/NMI/IRQ actually began.
    fn handle_boundary(&mut self, bus: &mut dyn Bus) -> bool {
        if self.state.pending == PendingInterrupt::Reset {
            self.state.reset(bus);
            return true;
        }

        match self.state.status {
            Status::Jammed => {
                // Only Reset (handled above) revives a jammed CPU.
                bus.read(self.state.pc);
                return false;
            }
            Status::Stopped => {
                bus.read(self.state.pc);
                return false;
            }
            Status::Waiting => {
                // WAI wakes on any asserted NMI or IRQ line, regardless of
                // IRQ_DISABLE (spec §4.5). Waking always proceeds straight
                // into servicing that same interrupt (the woken line is
                // what ends the wait; there is no "woken but still
                // pending" state), so this bypasses the ordinary
                // should_service_irq mask check below.
                self.state.status = Status::Running;
                if self.state.pending == PendingInterrupt::Nmi {
                    self.install_hardware_service(InterruptKind::Nmi);
                } else if self.state.pending == PendingInterrupt::Irq {
                    self.install_hardware_service(InterruptKind::Irq);
                } else {
                    bus.read(self.state.pc);
                    return false;
                }
                self.execute_current(bus);
                return true;
            }
            Status::Running | Status::Bypassed => {}
        }

        let serviced;
        if self.should_service_nmi() {
            self.install_hardware_service(InterruptKind::Nmi);
            serviced = true;
        } else if self.should_service_irq() {
            self.install_hardware_service(InterruptKind::Irq);
            serviced = true;
        } else {
            self.install_opcode_fetch();
            serviced = false;
        }
        self.execute_current(bus);
        serviced
    }

    fn install_hardware_service(&mut self, kind: InterruptKind) {
        self.state.pipeline = interrupt::build_hardware_service(kind);
        self.state.pipeline_index = 0;
        self.state.instruction_complete = false;
        self.state.active_interrupt = Some(kind);
        self.state.vector_address = kind.vector();
        match kind {
            InterruptKind::Nmi => self.state.pending = PendingInterrupt::None,
            InterruptKind::Irq => self.state.clear_irq(),
            InterruptKind::Brk => unreachable!("BRK is dispatched as an ordinary opcode"),
        }
    }

    fn install_opcode_fetch(&mut self) {
        let mut seq = crate::cpu::micro_op::MicroOpSeq::new();
        seq.push(MicroOp::FetchOpcode);
        self.state.pipeline = seq;
        self.state.pipeline_index = 0;
        self.state.instruction_complete = false;
        self.state.active_interrupt = None;
    }

    fn execute_current(&mut self, bus: &mut dyn Bus) {
        let op = match self.state.pipeline.get(self.state.pipeline_index) {
            Some(op) => op,
            None => {
                self.state.instruction_complete = true;
                return;
            }
        };

        if op == MicroOp::FetchOpcode {
            self.dispatch_fetch_opcode(bus);
            self.apply_halt_status_if_complete();
            return;
        }

        self.dispatch(bus, op);
        self.state.pipeline_index += 1;
        if self.state.pipeline_index >= self.state.pipeline.len() {
            self.state.instruction_complete = true;
        }
        self.apply_halt_status_if_complete();
    }

    fn dispatch_fetch_opcode(&mut self, bus: &mut dyn Bus) {
        let addr = self.state.pc;
        let opcode = bus.read(addr);
        self.state.pc = self.state.pc.wrapping_add(1);
        self.state.opcode_address = addr;
        self.state.current_opcode = opcode;

        let info = self.descriptor.decode(opcode);
        self.state.current_operation = info.operation;
        self.state.current_mode = info.mode;
        self.state.current_kind = info.kind;

        let seq = pipeline::build(info, self.descriptor.variant);
        self.state.pipeline = seq;
        self.state.pipeline_index = 1;
        self.state.instruction_complete = self.state.pipeline_index >= self.state.pipeline.len();

        // Conditionally-scheduled indexed read-form addressing: once we
        // know both index registers going in, we cannot yet know the
        // base address (still unfetched), so the provisional fixup
        // removal happens later, when the address is actually resolved
        // (see `FetchAbsHigh`/`FetchPointerHigh` below).
    }

    /// JAM/STP/WAI are not ordinary opcodes: completing one changes
    /// `Status` instead of just falling through to the next fetch (spec
    /// §4.5). `IgnoreHaltStopWait` turns all three into a plain NOP that
    /// reports `Bypassed` instead of actually halting (spec §3, a testing
    /// convenience for driving test ROMs that deliberately execute JAM).
    fn apply_halt_status_if_complete(&mut self) {
        if !self.state.instruction_complete {
            return;
        }
        if self.state.ignore_halt_stop_wait {
            match self.state.current_kind {
                OperationKind::Jam | OperationKind::Halt => {
                    self.state.status = Status::Bypassed;
                }
                _ => {}
            }
            return;
        }
        match self.state.current_kind {
            OperationKind::Jam => self.state.status = Status::Jammed,
            OperationKind::Halt => {
                self.state.status = match self.state.current_operation {
                    Operation::Wai => Status::Waiting,
                    Operation::Stp => Status::Stopped,
                    other => unreachable!("Halt kind on operation {other:?}"),
                };
            }
            _ => {}
        }
    }

    fn index_value(&self, reg: IndexReg) -> u8 {
        match reg {
            IndexReg::X => self.state.x,
            IndexReg::Y => self.state.y,
        }
    }

    /// Remove the still-pending `PageCrossFixup` immediately after the
    /// current index if this is a read-form instruction and no page
    /// was actually crossed (spec §4.4 "page-cross cycle penalties").
    fn maybe_drop_fixup(&mut self) {
        if self.state.current_kind != OperationKind::Read {
            return; // store/RMW: the fixup cycle is unconditional, keep it.
        }
        if self.state.page_crossed {
            return;
        }
        let next = self.state.pipeline_index + 1;
        if self.state.pipeline.get(next) == Some(MicroOp::PageCrossFixup) {
            self.state.pipeline.remove_at(next);
        }
    }

    fn dispatch(&mut self, bus: &mut dyn Bus, op: MicroOp) {
        match op {
            MicroOp::FetchOpcode => unreachable!("handled by dispatch_fetch_opcode"),

            MicroOp::FetchOperandByte => {
                let _ = bus.read(self.state.pc);
                self.state.pc = self.state.pc.wrapping_add(1);
            }

            MicroOp::FetchZpAddress => {
                let lo = bus.read(self.state.pc);
                self.state.pc = self.state.pc.wrapping_add(1);
                self.state.temp_address = lo as u16;
            }

            MicroOp::ZpIndexDummyRead(reg) => {
                let _ = bus.read(self.state.temp_address);
                let idx = self.index_value(reg);
                let lo = (self.state.temp_address as u8).wrapping_add(idx);
                self.state.temp_address = lo as u16;
            }

            MicroOp::FetchAbsLow => {
                let lo = bus.read(self.state.pc);
                self.state.pc = self.state.pc.wrapping_add(1);
                self.state.scratch_lo = lo;
            }

            MicroOp::FetchAbsHigh { index } => {
                let hi = bus.read(self.state.pc);
                self.state.pc = self.state.pc.wrapping_add(1);
                let base = ((hi as u16) << 8) | self.state.scratch_lo as u16;
                let target = match index {
                    None => base,
                    Some(reg) => {
                        let idx = self.index_value(reg);
                        let low_sum = self.state.scratch_lo as u16 + idx as u16;
                        self.state.page_crossed = low_sum > 0xFF;
                        base.wrapping_add(idx as u16)
                    }
                };
                self.state.temp_address = target;
                if matches!(
                    self.state.current_kind,
                    OperationKind::JmpAbsolute | OperationKind::Jsr
                ) {
                    self.state.pc = target;
                } else if index.is_some() {
                    self.maybe_drop_fixup();
                }
            }

            MicroOp::FetchPointerLow => {
                let lo = bus.read(self.state.temp_address);
                self.state.scratch_lo = lo;
            }

            MicroOp::FetchPointerHigh { index_after } => {
                let hi_addr = self.pointer_high_address();
                let hi = bus.read(hi_addr);
                let base = ((hi as u16) << 8) | self.state.scratch_lo as u16;
                let target = match index_after {
                    None => base,
                    Some(reg) => {
                        let idx = self.index_value(reg);
                        let low_sum = self.state.scratch_lo as u16 + idx as u16;
                        self.state.page_crossed = low_sum > 0xFF;
                        base.wrapping_add(idx as u16)
                    }
                };
                self.state.temp_address = target;
                if self.state.current_kind == OperationKind::JmpIndirect {
                    self.state.pc = target;
                } else if index_after.is_some() {
                    self.maybe_drop_fixup();
                }
            }

            MicroOp::PageCrossFixup => {
                // Dummy read at the not-yet-corrected address, matching
                // real hardware's bus-access sequence for this cycle.
                let wrong_hi = self.state.temp_address.wrapping_sub(0x100);
                let addr = if self.state.page_crossed {
                    wrong_hi
                } else {
                    self.state.temp_address
                };
                let _ = bus.read(addr);
            }

            MicroOp::ReadEffectiveAndExecute => {
                let value = if self.state.current_mode == AddressMode::Immediate {
                    let v = bus.read(self.state.pc);
                    self.state.pc = self.state.pc.wrapping_add(1);
                    v
                } else {
                    bus.read(self.state.temp_address)
                };
                if matches!(
                    self.state.current_kind,
                    OperationKind::ReadModifyWrite | OperationKind::ZpBranch
                ) {
                    // RMW's read cycle only captures the value (the
                    // following dummy-write/read and compute-and-write
                    // cycles do the mutation); BBR/BBS's zero-page read
                    // only feeds the branch-condition test below.
                    self.state.temp_value = value as u16;
                } else {
                    operations::apply_read(
                        &mut self.state,
                        self.descriptor.variant,
                        self.state.current_operation,
                        self.state.current_mode,
                        value,
                    );
                }
            }

            MicroOp::ComputeAndWriteEffective => {
                let value = operations::compute_store(&self.state, self.state.current_operation);
                bus.write(self.state.temp_address, value);
            }

            MicroOp::RmwDummyWriteOld => {
                bus.write(self.state.temp_address, self.state.temp_value as u8);
            }

            MicroOp::RmwDummyReadSame => {
                let _ = bus.read(self.state.temp_address);
            }

            MicroOp::RmwComputeAndWrite => {
                let result = operations::apply_rmw(
                    &mut self.state,
                    self.descriptor.variant,
                    self.state.current_operation,
                    self.state.temp_value as u8,
                );
                bus.write(self.state.temp_address, result);
            }

            MicroOp::ImpliedOrAccumulatorExecute => {
                let _ = bus.read(self.state.pc);
                operations::apply_implied(&mut self.state, self.state.current_operation);
            }

            MicroOp::BranchFetchOffsetAndDecide => {
                let offset = bus.read(self.state.pc) as i8;
                self.state.pc = self.state.pc.wrapping_add(1);
                let met = match self.state.current_operation {
                    Operation::Branch(cond) => cond.is_met(&self.state),
                    Operation::BraAlways => true,
                    Operation::Bbr(bit) => (self.state.temp_value as u8 & (1 << bit)) == 0,
                    Operation::Bbs(bit) => (self.state.temp_value as u8 & (1 << bit)) != 0,
                    other => unreachable!("branch dispatch on non-branch operation {other:?}"),
                };
                self.state.branch_condition_met = met;
                self.state.temp_address = self.state.pc.wrapping_add(offset as i16 as u16);
                if !met {
                    let cur = self.state.pipeline_index;
                    self.state.pipeline.truncate(cur + 1);
                }
            }

            MicroOp::BranchApplyLow => {
                let _ = bus.read(self.state.pc);
                let old_pc = self.state.pc;
                let new_lo = self.state.temp_address as u8;
                self.state.pc = (old_pc & 0xFF00) | new_lo as u16;
                let crosses = (self.state.temp_address & 0xFF00) != (old_pc & 0xFF00);
                self.state.page_crossed = crosses;
                if !crosses {
                    let cur = self.state.pipeline_index;
                    self.state.pipeline.truncate(cur + 1);
                }
            }

            MicroOp::BranchApplyPageFix => {
                let _ = bus.read(self.state.pc);
                self.state.pc = self.state.temp_address;
            }

            MicroOp::PushPch => {
                let hi = (self.state.pc >> 8) as u8;
                self.state.push_u8(bus, hi);
            }
            MicroOp::PushPcl => {
                let lo = self.state.pc as u8;
                self.state.push_u8(bus, lo);
            }
            MicroOp::PushStatusForInterrupt => {
                let break_flag = self
                    .state
                    .active_interrupt
                    .map(|k| k.pushes_break_flag())
                    .unwrap_or(self.state.current_operation == Operation::Brk);
                let value = self.state.compose_status_for_push(break_flag);
                self.state.push_u8(bus, value);
                self.state.set_flag(IRQ_DISABLE);
                if self.descriptor.variant.clears_d_on_interrupt() {
                    self.state.clear_flag(crate::cpu::state::DECIMAL);
                }
            }
            MicroOp::PullPcl => {
                let lo = self.state.pull_u8(bus);
                self.state.scratch_lo = lo;
            }
            MicroOp::PullPch => {
                let hi = self.state.pull_u8(bus);
                self.state.pc = ((hi as u16) << 8) | self.state.scratch_lo as u16;
            }
            MicroOp::PullStatus => {
                let value = self.state.pull_u8(bus);
                self.state.apply_pulled_status(value);
            }
            MicroOp::InternalIdle => {
                let _ = bus.read(self.state.pc);
            }
            MicroOp::PushByte => {
                let value = match self.state.current_operation {
                    Operation::Pha => self.state.a,
                    Operation::Php => self.state.compose_status_for_push(true),
                    Operation::Phx => self.state.x,
                    Operation::Phy => self.state.y,
                    other => unreachable!("PushByte dispatch on {other:?}"),
                };
                self.state.push_u8(bus, value);
            }
            MicroOp::PullByte => {
                let value = self.state.pull_u8(bus);
                match self.state.current_operation {
                    Operation::Pla => {
                        self.state.a = value;
                        self.state.update_zn(value);
                    }
                    Operation::Plp => self.state.apply_pulled_status(value),
                    Operation::Plx => {
                        self.state.x = value;
                        self.state.update_zn(value);
                    }
                    Operation::Ply => {
                        self.state.y = value;
                        self.state.update_zn(value);
                    }
                    other => unreachable!("PullByte dispatch on {other:?}"),
                }
            }
            MicroOp::VectorFetchLow => {
                let addr = self
                    .state
                    .active_interrupt
                    .map(|k| k.vector())
                    .unwrap_or(crate::bus::IRQ_VECTOR);
                self.state.vector_address = addr;
                self.state.scratch_lo = bus.read(addr);
            }
            MicroOp::VectorFetchHigh => {
                let hi = bus.read(self.state.vector_address.wrapping_add(1));
                self.state.pc = ((hi as u16) << 8) | self.state.scratch_lo as u16;
            }
        }
    }

    fn pointer_high_address(&self) -> u16 {
        let lo_addr = self.state.temp_address;
        match self.state.current_mode {
            AddressMode::IndirectX | AddressMode::IndirectY | AddressMode::IndirectZp => {
                // Pointer lives entirely in zero page; wraps within it.
                (lo_addr & 0xFF00) | ((lo_addr as u8).wrapping_add(1) as u16)
            }
            AddressMode::Indirect if self.descriptor.variant.has_jmp_indirect_bug() => {
                (lo_addr & 0xFF00) | ((lo_addr as u8).wrapping_add(1) as u16)
            }
            _ => lo_addr.wrapping_add(1),
        }
    }
}
