#![doc = r#"
bus - the CPU-facing bus contract (spec §4.1).

A `Bus` is the 64 KiB flat address space the CPU core reaches memory
through. It exposes exactly three operations:

- `read`/`write`: each counts as one emulated bus cycle and may have
  side effects (I/O, cycle counters, interrupt feedback registers).
- `peek`: side-effect-free and never counts as a cycle. The engine uses
  it to inspect the upcoming opcode at an instruction boundary without
  double-counting the fetch (see `cpu::engine`).

Addresses are 16-bit with no alignment constraints. The reset/IRQ/NMI
vectors live at fixed locations, read little-endian.
"#]

/// Reset vector: PC is loaded from here on every reset.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ/BRK vector: shared by hardware IRQ and the software BRK instruction.
pub const IRQ_VECTOR: u16 = 0xFFFE;
/// NMI vector.
pub const NMI_VECTOR: u16 = 0xFFFA;

/// The CPU-facing memory contract.
///
/// Implementations own the 64 KiB address space (RAM, ROM, mapped I/O)
/// and any side effects reads/writes should have. The CPU core never
/// inspects addresses beyond issuing reads/writes/peeks at this trait.
pub trait Bus {
    /// Read one byte, counting as one bus cycle. May have side effects.
    fn read(&mut self, addr: u16) -> u8;

    /// Write one byte, counting as one bus cycle. May have side effects.
    fn write(&mut self, addr: u16, value: u8);

    /// Side-effect-free inspection of a byte. Never counts as a cycle.
    fn peek(&self, addr: u16) -> u8;

    /// Read a little-endian 16-bit word via two `read` calls (two cycles).
    #[inline]
    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Peek a little-endian 16-bit word without consuming cycles.
    #[inline]
    fn peek_word(&self, addr: u16) -> u16 {
        let lo = self.peek(addr) as u16;
        let hi = self.peek(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}
