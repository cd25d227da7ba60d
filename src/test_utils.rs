//! Shared test utilities for building small programs on a `RamBus`.
//!
//! These helpers de-duplicate fixture setup across the `cpu` module's
//! embedded tests and the top-level integration tests: most cases only
//! care about "put this program at this address, point reset at it, run
//! N instructions, then look at the registers."

#![allow(dead_code)]

use crate::bus::Bus;
use crate::cpu::Cpu6502;
use crate::ram_bus::RamBus;
use crate::variant::Variant;

/// Build a `RamBus` with `program` loaded at `load_at` and the reset
/// vector pointed at it.
pub fn bus_with_program(load_at: u16, program: &[u8]) -> RamBus {
    let mut bus = RamBus::new();
    bus.load(load_at, program);
    bus.set_reset_vector(load_at);
    bus
}

/// Build and reset a `Cpu6502` of `variant` against a bus already primed
/// with `bus_with_program` (or any other pre-vectored bus).
pub fn cpu_after_reset(variant: Variant, bus: &mut RamBus) -> Cpu6502 {
    let mut cpu = Cpu6502::new(variant);
    cpu.reset(bus);
    cpu
}

/// Convenience wrapper: load `program` at `load_at`, reset a CPU of
/// `variant` onto it, and hand back both halves ready to `step`/`run`.
pub fn program_cpu(variant: Variant, load_at: u16, program: &[u8]) -> (Cpu6502, RamBus) {
    let mut bus = bus_with_program(load_at, program);
    let cpu = cpu_after_reset(variant, &mut bus);
    (cpu, bus)
}

/// Run `cpu` for up to `max_instructions` whole instructions and assert
/// the accumulator equals `expected` afterward. Panics with the actual
/// value on mismatch, for a more useful test failure than a bare
/// `assert_eq!` against `cpu.state().a`.
pub fn assert_a_eq(cpu: &mut Cpu6502, bus: &mut dyn Bus, max_instructions: u32, expected: u8) {
    for _ in 0..max_instructions {
        cpu.step(bus);
    }
    let actual = cpu.state().a;
    assert_eq!(
        actual, expected,
        "expected A={expected:#04X} after {max_instructions} instructions, got A={actual:#04X}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_cpu_resets_pc_to_load_address() {
        let (cpu, _bus) = program_cpu(Variant::NmosFull, 0x8000, &[0xEA]);
        assert_eq!(cpu.state().pc, 0x8000);
    }

    #[test]
    fn assert_a_eq_passes_for_matching_accumulator() {
        // LDA #$42
        let (mut cpu, mut bus) = program_cpu(Variant::NmosFull, 0x8000, &[0xA9, 0x42]);
        assert_a_eq(&mut cpu, &mut bus, 1, 0x42);
    }
}
