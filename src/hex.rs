#![doc = r#"
hex - a minimal Intel-HEX loader (spec §6 "External Interfaces").

This is host-side tooling, not part of the CPU core's own contract: the
harness binary and test fixtures use it to get a ROM image onto a
`Bus` implementor before handing control to a `Cpu6502`. Parse errors
are reported as `Result<_, String>`, matching the host-facing error
convention used throughout this crate (no panics on malformed input).
"#]

use crate::bus::Bus;

/// One parsed Intel-HEX data record (type 0x00 only; this loader does
/// not support extended segment/linear address records — records are
/// expected to fit in a flat 16-bit address space, spec §6).
#[derive(Debug, Clone)]
pub struct HexRecord {
    pub address: u16,
    pub data: Vec<u8>,
}

/// Parse an Intel-HEX source, returning the data records in file
/// order. Stops at the first End Of File record (type 0x01); anything
/// after it is ignored, matching common Intel-HEX tooling behavior.
pub fn parse(source: &str) -> Result<Vec<HexRecord>, String> {
    let mut records = Vec::new();

    for (line_no, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_no + 1;
        let line = line
            .strip_prefix(':')
            .ok_or_else(|| format!("line {line_no}: missing ':' record marker"))?;

        let bytes = decode_hex_bytes(line, line_no)?;
        if bytes.len() < 5 {
            return Err(format!("line {line_no}: record shorter than the 5-byte header"));
        }

        let byte_count = bytes[0] as usize;
        let address = ((bytes[1] as u16) << 8) | bytes[2] as u16;
        let record_type = bytes[3];
        let expected_len = 5 + byte_count;
        if bytes.len() != expected_len {
            return Err(format!(
                "line {line_no}: byte count {byte_count} does not match record length {}",
                bytes.len()
            ));
        }

        let payload = &bytes[4..4 + byte_count];
        let checksum = bytes[4 + byte_count];
        let computed = checksum_of(&bytes[..4 + byte_count]);
        if computed != checksum {
            return Err(format!(
                "line {line_no}: checksum mismatch (expected {checksum:#04X}, computed {computed:#04X})"
            ));
        }

        match record_type {
            0x00 => records.push(HexRecord {
                address,
                data: payload.to_vec(),
            }),
            0x01 => break,
            other => {
                return Err(format!(
                    "line {line_no}: unsupported Intel-HEX record type {other:#04X}"
                ))
            }
        }
    }

    Ok(records)
}

/// Parse and load every data record directly onto `bus` via `Bus::write`.
pub fn load_onto_bus(bus: &mut dyn Bus, source: &str) -> Result<(), String> {
    for record in parse(source)? {
        let mut addr = record.address;
        for byte in record.data {
            bus.write(addr, byte);
            addr = addr.wrapping_add(1);
        }
    }
    Ok(())
}

fn decode_hex_bytes(hex: &str, line_no: usize) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err(format!("line {line_no}: odd number of hex digits"));
    }
    let mut out = Vec::with_capacity(hex.len() / 2);
    let chars: Vec<char> = hex.chars().collect();
    for pair in chars.chunks(2) {
        let s: String = pair.iter().collect();
        let byte = u8::from_str_radix(&s, 16)
            .map_err(|_| format!("line {line_no}: invalid hex byte '{s}'"))?;
        out.push(byte);
    }
    Ok(out)
}

fn checksum_of(bytes: &[u8]) -> u8 {
    let sum: u8 = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (!sum).wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ram_bus::RamBus;

    #[test]
    fn parses_a_single_data_record() {
        // :03 0000 00 010203 F7
        let src = ":03000000010203F7\n:00000001FF\n";
        let records = parse(src).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, 0x0000);
        assert_eq!(records[0].data, vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn rejects_bad_checksum() {
        let src = ":03000000010203FF\n:00000001FF\n";
        assert!(parse(src).is_err());
    }

    #[test]
    fn stops_at_eof_record() {
        let src = ":00000001FF\n:03000000010203F7\n";
        let records = parse(src).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn loads_onto_bus() {
        let src = ":03020000AABBCCCA\n:00000001FF\n";
        let mut bus = RamBus::new();
        load_onto_bus(&mut bus, src).unwrap();
        assert_eq!(bus.read(0x0200), 0xAA);
        assert_eq!(bus.read(0x0201), 0xBB);
        assert_eq!(bus.read(0x0202), 0xCC);
    }

    #[test]
    fn rejects_missing_colon() {
        let src = "03000000010203F9\n";
        assert!(parse(src).is_err());
    }
}
