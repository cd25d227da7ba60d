#![doc = r#"
harness - host-side test-fixture tooling: a JSON config describing a
directory of ROM images plus their success/error sense addresses, and a
runner that loads one onto a `RamBus`, drives a `Cpu6502` until a sense
address is hit or the instruction ceiling expires, and reports a verdict
(spec §6, §7).

Neither module is part of the CPU core's own contract; they exist so
the `cpu65xx-harness` binary and integration tests share one
implementation of "run this fixture and tell me if it passed".
"#]

pub mod config;
pub mod runner;

pub use config::HarnessConfig;
pub use runner::{run_fixture, Verdict};
