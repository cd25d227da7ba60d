#![doc = r#"
runner - loads one fixture's hex image onto a `RamBus`, drives a
`Cpu6502` instruction by instruction, and reports whether execution
reached its configured success or error address (spec §6, §7).

The interrupt-test feedback register at `$BFFC` is polled once per
instruction: bit 0 is the live level of the IRQ line (mirrored into
`signal_irq`/`clear_irq` every instruction, matching a level-sensitive
input) and bit 1 triggers `signal_nmi` on a 0->1 edge (spec §6
"Test-harness configuration").
"#]

use crate::bus::Bus;
use crate::cpu::Cpu6502;
use crate::harness::config::FixtureConfig;
use crate::hex;
use crate::ram_bus::RamBus;
use crate::variant::Variant;

/// Interrupt-test feedback register: bit 0 = IRQ level, bit 1 = NMI edge.
const FEEDBACK_REGISTER: u16 = 0xBFFC;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success { instructions_executed: u32 },
    Failure { instructions_executed: u32 },
    /// Neither sense address was reached within `max_instructions`.
    Timeout,
}

/// Load and run one fixture to completion.
pub fn run_fixture(
    fixture: &FixtureConfig,
    test_data_path: &str,
    variant: Variant,
    max_instructions: u32,
) -> Result<Verdict, String> {
    let hex_path = fixture.hex_path(test_data_path);
    let hex_source =
        std::fs::read_to_string(&hex_path).map_err(|e| format!("reading {hex_path:?}: {e}"))?;
    run_fixture_from_source(fixture, &hex_source, variant, max_instructions)
}

/// Same as `run_fixture`, but takes the hex source directly rather than
/// reading it from disk — used by tests and by callers that already
/// have the image in hand (e.g. a single `RunHex` CLI invocation).
pub fn run_fixture_from_source(
    fixture: &FixtureConfig,
    hex_source: &str,
    variant: Variant,
    max_instructions: u32,
) -> Result<Verdict, String> {
    let mut bus = RamBus::new();
    hex::load_onto_bus(&mut bus, hex_source)?;
    bus.set_reset_vector(fixture.start_address()?);

    let success_address = fixture.success_address()?;
    let error_address = fixture.error_address()?;

    let mut cpu = Cpu6502::new(variant);
    cpu.reset(&mut bus);

    let mut nmi_edge_primed = false;
    for executed in 0..max_instructions {
        if success_address == Some(cpu.state().pc) {
            return Ok(Verdict::Success {
                instructions_executed: executed,
            });
        }
        if error_address == Some(cpu.state().pc) {
            return Ok(Verdict::Failure {
                instructions_executed: executed,
            });
        }

        let feedback = bus.peek(FEEDBACK_REGISTER);
        if feedback & 0x01 != 0 {
            cpu.signal_irq();
        } else {
            cpu.clear_irq();
        }
        let nmi_line = feedback & 0x02 != 0;
        if nmi_line && !nmi_edge_primed {
            cpu.signal_nmi();
        }
        nmi_edge_primed = nmi_line;

        cpu.step(&mut bus);
    }

    Ok(Verdict::Timeout)
}
