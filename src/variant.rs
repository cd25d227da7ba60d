#![doc = r#"
variant - which of the four 6502-family parts a `Cpu6502` emulates.

Rather than modeling variants through inheritance or virtual dispatch,
each `Cpu6502` holds a `Variant` value and looks up a small immutable
descriptor (`cpu::opcode::VariantDescriptor`) once at construction time:
the opcode→micro-op pipeline table, the `clear_d_on_interrupt` policy,
and the undocumented-opcode policy. This keeps variant differences out
of the hot per-cycle dispatch loop (design note, spec.md §9).
"#]

/// Which 6502-family part this CPU core reproduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Original NMOS 6502, full undocumented-opcode behavior (illegal
    /// instructions execute their documented quirky effects; the twelve
    /// JAM/KIL opcodes halt until reset).
    NmosFull,
    /// NMOS 6502 with undocumented opcodes treated as no-ops of the
    /// correct addressing-mode timing. No JAM opcodes.
    NmosSimple,
    /// WDC 65C02: NMOS bugs fixed (JMP-indirect), new instructions,
    /// WAI/STP halt states.
    Wdc65C02,
    /// Rockwell 65C02: WDC 65C02 plus RMB/SMB/BBR/BBS bit-manipulation
    /// opcodes, but no WAI/STP (those opcodes are implied-mode NOPs).
    Rockwell65C02,
}

impl Variant {
    /// Whether this variant is one of the two NMOS parts.
    #[inline]
    pub fn is_nmos(self) -> bool {
        matches!(self, Variant::NmosFull | Variant::NmosSimple)
    }

    /// Whether this variant is one of the two CMOS parts.
    #[inline]
    pub fn is_cmos(self) -> bool {
        matches!(self, Variant::Wdc65C02 | Variant::Rockwell65C02)
    }

    /// CMOS parts clear the D flag on entry to BRK/IRQ/NMI handlers;
    /// NMOS parts leave D unchanged (spec.md §4.4, §4.5, §8 "Variant laws").
    #[inline]
    pub fn clears_d_on_interrupt(self) -> bool {
        self.is_cmos()
    }

    /// Whether this variant reproduces the NMOS `JMP ($xxFF)` page-wrap
    /// bug. CMOS parts fix it, at the cost of one extra cycle.
    #[inline]
    pub fn has_jmp_indirect_bug(self) -> bool {
        self.is_nmos()
    }

    /// Whether WAI ($CB) and STP ($DB) are implemented as halt states.
    /// Rockwell lacks both; they decode as implied-mode NOPs there.
    #[inline]
    pub fn has_wai_stp(self) -> bool {
        matches!(self, Variant::Wdc65C02)
    }

    /// Whether BCD N/Z/V reflect the BCD-corrected result (CMOS) or the
    /// binary pre-correction intermediate (NMOS). See spec.md §4.2.
    #[inline]
    pub fn bcd_flags_from_corrected_result(self) -> bool {
        self.is_cmos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nmos_variants_keep_d_on_interrupt() {
        assert!(!Variant::NmosFull.clears_d_on_interrupt());
        assert!(!Variant::NmosSimple.clears_d_on_interrupt());
    }

    #[test]
    fn cmos_variants_clear_d_on_interrupt() {
        assert!(Variant::Wdc65C02.clears_d_on_interrupt());
        assert!(Variant::Rockwell65C02.clears_d_on_interrupt());
    }

    #[test]
    fn only_wdc_has_wai_stp() {
        assert!(Variant::Wdc65C02.has_wai_stp());
        assert!(!Variant::Rockwell65C02.has_wai_stp());
        assert!(!Variant::NmosFull.has_wai_stp());
        assert!(!Variant::NmosSimple.has_wai_stp());
    }

    #[test]
    fn jmp_indirect_bug_only_on_nmos() {
        assert!(Variant::NmosFull.has_jmp_indirect_bug());
        assert!(Variant::NmosSimple.has_jmp_indirect_bug());
        assert!(!Variant::Wdc65C02.has_jmp_indirect_bug());
        assert!(!Variant::Rockwell65C02.has_jmp_indirect_bug());
    }
}
