#![doc = r#"
cpu - the cycle-accurate 6502-family core (spec §4).

Submodules, roughly outside-in:

- `state`: the architectural register/flag aggregate plus pipeline
  bookkeeping (§3).
- `micro_op`: the per-cycle tag enum and fixed-capacity pipeline buffer
  (§4.3).
- `addressing`: addressing-mode micro-op prefixes (§4.4).
- `alu`: shared binary/BCD add-with-carry kernel (§4.2, §4.4).
- `operations`: what each opcode does once an operand is in hand (§4.4).
- `opcode`: the per-variant 256-entry decode table (§4.4).
- `pipeline`: composes addressing + operation into a full instruction
  pipeline (§4.3).
- `interrupt`: the hardware-interrupt service sequence (§4.5).
- `engine`: the public `Cpu6502` façade and its per-cycle dispatch loop
  (§4.3, §4.5, §4.6).
"#]

pub mod addressing;
pub mod alu;
pub mod engine;
pub mod interrupt;
pub mod micro_op;
pub mod opcode;
pub mod operations;
pub mod pipeline;
pub mod state;

pub use engine::Cpu6502;
pub use state::{CpuState, PendingInterrupt, Status};
