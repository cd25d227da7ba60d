use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use cpu65xx::harness::config::HarnessConfig;
use cpu65xx::harness::runner::{run_fixture, Verdict};
use cpu65xx::hex;
use cpu65xx::ram_bus::RamBus;
use cpu65xx::variant::Variant;

#[derive(Parser)]
#[command(name = "cpu65xx-harness", about = "Run 6502-family test fixtures")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one named fixture from a JSON config and report pass/fail.
    RunFixture {
        /// Path to the harness JSON config.
        config_path: PathBuf,
        /// `name` of the fixture to run, as listed in the config's `tests` array.
        test_name: String,
        #[arg(long, value_enum, default_value = "nmos-full")]
        variant: CliVariant,
        #[arg(long, default_value_t = 100_000)]
        max_instructions: u32,
    },
    /// Run every fixture in a JSON config; exit 0 only if all pass.
    RunAll {
        /// Path to the harness JSON config.
        config_path: PathBuf,
        #[arg(long, value_enum, default_value = "nmos-full")]
        variant: CliVariant,
        #[arg(long, default_value_t = 100_000)]
        max_instructions: u32,
    },
    /// Load a bare Intel-HEX image and print the CPU state after N
    /// instructions, without any success/failure sense logic.
    RunHex {
        hex_path: PathBuf,
        #[arg(long, value_enum, default_value = "nmos-full")]
        variant: CliVariant,
        #[arg(long, default_value_t = 1000)]
        max_instructions: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CliVariant {
    NmosFull,
    NmosSimple,
    Wdc65C02,
    Rockwell65C02,
}

impl From<CliVariant> for Variant {
    fn from(v: CliVariant) -> Self {
        match v {
            CliVariant::NmosFull => Variant::NmosFull,
            CliVariant::NmosSimple => Variant::NmosSimple,
            CliVariant::Wdc65C02 => Variant::Wdc65C02,
            CliVariant::Rockwell65C02 => Variant::Rockwell65C02,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::RunFixture {
            config_path,
            test_name,
            variant,
            max_instructions,
        } => run_fixture_command(&config_path, &test_name, variant.into(), max_instructions),
        Command::RunAll {
            config_path,
            variant,
            max_instructions,
        } => run_all_command(&config_path, variant.into(), max_instructions),
        Command::RunHex {
            hex_path,
            variant,
            max_instructions,
        } => run_hex_command(&hex_path, variant.into(), max_instructions),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(config_path: &PathBuf) -> Result<HarnessConfig, String> {
    let config_text =
        fs::read_to_string(config_path).map_err(|e| format!("reading {config_path:?}: {e}"))?;
    HarnessConfig::from_json(&config_text)
}

fn report_verdict(name: &str, verdict: Verdict) -> Result<(), String> {
    match verdict {
        Verdict::Success { instructions_executed } => {
            println!("PASS {name} ({instructions_executed} instructions)");
            Ok(())
        }
        Verdict::Failure { instructions_executed } => {
            println!("FAIL {name} ({instructions_executed} instructions)");
            Err(format!("{name}: reached its error address"))
        }
        Verdict::Timeout => {
            println!("TIMEOUT {name}");
            Err(format!("{name}: timed out"))
        }
    }
}

fn run_fixture_command(
    config_path: &PathBuf,
    test_name: &str,
    variant: Variant,
    max_instructions: u32,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let fixture = config
        .tests
        .iter()
        .find(|f| f.name == test_name)
        .ok_or_else(|| format!("no fixture named {test_name:?} in {config_path:?}"))?;

    let verdict = run_fixture(fixture, &config.test_data_path, variant, max_instructions)?;
    report_verdict(&fixture.name, verdict)
}

/// Run every fixture in `config_path`, selecting a variant and instruction
/// ceiling for all of them; exit code 0 only if every fixture passes
/// (spec §6 "CLI surface").
fn run_all_command(config_path: &PathBuf, variant: Variant, max_instructions: u32) -> Result<(), String> {
    let config = load_config(config_path)?;
    let mut failures = Vec::new();

    for fixture in &config.tests {
        let verdict = run_fixture(fixture, &config.test_data_path, variant, max_instructions)?;
        if let Err(message) = report_verdict(&fixture.name, verdict) {
            failures.push(message);
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} of {} fixtures failed", failures.len(), config.tests.len()))
    }
}

fn run_hex_command(hex_path: &PathBuf, variant: Variant, max_instructions: u32) -> Result<(), String> {
    let source = fs::read_to_string(hex_path).map_err(|e| format!("reading {hex_path:?}: {e}"))?;
    let mut bus = RamBus::new();
    hex::load_onto_bus(&mut bus, &source)?;

    let mut cpu = cpu65xx::Cpu6502::new(variant);
    cpu.reset(&mut bus);

    for _ in 0..max_instructions {
        cpu.step(&mut bus);
    }

    let state = cpu.state();
    println!(
        "PC={:#06X} A={:#04X} X={:#04X} Y={:#04X} SP={:#04X} P={:#04X}",
        state.pc, state.a, state.x, state.y, state.sp, state.p
    );
    Ok(())
}
