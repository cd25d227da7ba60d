#![doc = r#"
ram_bus - a minimal flat 64 KiB `Bus` implementation.

This is the "example RAM bus" spec.md calls an out-of-scope external
collaborator (§1): it consumes the `Bus` contract, it is not part of the
core's responsibility, and the CPU never knows it exists as anything
other than a `Bus` implementor. It exists so tests, doctests, and the
harness binary have something to plug a `Cpu6502` into.
"#]

use crate::bus::Bus;

/// A flat 64 KiB byte array with no mapping, mirroring, or I/O side
/// effects. Every address is backed by real storage.
#[derive(Clone)]
pub struct RamBus {
    mem: Box<[u8; 0x10000]>,
}

impl RamBus {
    /// All-zero 64 KiB image.
    pub fn new() -> Self {
        Self {
            mem: Box::new([0u8; 0x10000]),
        }
    }

    /// Overwrite a contiguous range starting at `addr`, wrapping at the
    /// top of the address space.
    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let mut a = addr;
        for &b in data {
            self.mem[a as usize] = b;
            a = a.wrapping_add(1);
        }
    }

    /// Set the reset vector ($FFFC/$FFFD) to `pc`.
    pub fn set_reset_vector(&mut self, pc: u16) {
        self.load(crate::bus::RESET_VECTOR, &pc.to_le_bytes());
    }

    /// Set the IRQ/BRK vector ($FFFE/$FFFF) to `pc`.
    pub fn set_irq_vector(&mut self, pc: u16) {
        self.load(crate::bus::IRQ_VECTOR, &pc.to_le_bytes());
    }

    /// Set the NMI vector ($FFFA/$FFFB) to `pc`.
    pub fn set_nmi_vector(&mut self, pc: u16) {
        self.load(crate::bus::NMI_VECTOR, &pc.to_le_bytes());
    }
}

impl Default for RamBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for RamBus {
    #[inline]
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    #[inline]
    fn write(&mut self, addr: u16, value: u8) {
        self.mem[addr as usize] = value;
    }

    #[inline]
    fn peek(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_read_round_trip() {
        let mut bus = RamBus::new();
        bus.load(0x0200, &[0x01, 0x02, 0x03]);
        assert_eq!(bus.read(0x0200), 0x01);
        assert_eq!(bus.read(0x0201), 0x02);
        assert_eq!(bus.read(0x0202), 0x03);
    }

    #[test]
    fn peek_does_not_mutate() {
        let mut bus = RamBus::new();
        bus.load(0x4000, &[0xAB]);
        assert_eq!(bus.peek(0x4000), 0xAB);
        assert_eq!(bus.peek(0x4000), 0xAB);
    }

    #[test]
    fn vectors_are_little_endian() {
        let mut bus = RamBus::new();
        bus.set_reset_vector(0x8123);
        assert_eq!(bus.read(0xFFFC), 0x23);
        assert_eq!(bus.read(0xFFFD), 0x81);
        assert_eq!(bus.read_word(0xFFFC), 0x8123);
    }

    #[test]
    fn load_wraps_at_top_of_address_space() {
        let mut bus = RamBus::new();
        bus.load(0xFFFF, &[0xAA, 0xBB]);
        assert_eq!(bus.read(0xFFFF), 0xAA);
        assert_eq!(bus.read(0x0000), 0xBB);
    }
}
