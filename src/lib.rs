#![doc = r#"
cpu65xx: cycle-accurate 6502-family CPU core.

This crate exposes the emulator core used by the harness binary and by
host-level tooling. It reproduces the externally observable behavior of
four variants at single-clock-cycle granularity:

- `Variant::NmosFull`   - original NMOS 6502 with the stable undocumented
  opcodes (illegal instructions, JAM/KIL halts).
- `Variant::NmosSimple` - the same NMOS control flow, but every
  undocumented opcode behaves as a no-op of the correct timing.
- `Variant::Wdc65C02`   - WDC 65C02: fixed JMP-indirect bug, new
  instructions (STZ, PHX/PHY/PLX/PLY, BRA, (zp), TRB/TSB, ...), WAI/STP.
- `Variant::Rockwell65C02` - WDC 65C02 plus RMB/SMB/BBR/BBS bit ops,
  minus WAI/STP (those opcodes are NOPs).

Modules:
- bus: the 8-bit read/write/peek contract the CPU core reaches memory
  through, plus the fixed interrupt-vector addresses.
- ram_bus: a minimal flat 64 KiB `Bus` implementation for tests and the
  harness binary. Not part of the core; an example collaborator.
- variant: the `Variant` enum and the per-variant descriptor.
- cpu: the CPU core itself (state, micro-op pipeline, addressing modes,
  ALU, opcode tables, interrupt engine, and the public façade).
- hex: host-side Intel-HEX loader.
- harness: host-side JSON test-fixture configuration and runner.

In tests, shared fixture-building helpers are available under
`crate::test_utils`.
"#]

pub mod bus;
pub mod cpu;
pub mod harness;
pub mod hex;
pub mod ram_bus;
pub mod variant;

pub use bus::Bus;
pub use cpu::Cpu6502;
pub use ram_bus::RamBus;
pub use variant::Variant;

#[cfg(test)]
pub mod test_utils;
