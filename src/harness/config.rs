#![doc = r#"
config - the JSON shape of a test-harness run (spec §6).

```json
{
  "testDataPath": "fixtures/",
  "tests": [
    {
      "name": "adc_bcd",
      "hexFile": "adc_bcd.hex",
      "startAddress": "8000",
      "successAddress": "810C"
    },
    {
      "name": "jam_trap",
      "hexFile": "jam_trap.hex",
      "startAddress": "8000",
      "errorAddress": "8100"
    }
  ]
}
```

A root object carries `testDataPath` (joined with each fixture's `hexFile`
to locate its Intel-HEX image) and a `tests` array, one object per
fixture. Addresses are hex strings with no `$`/`0x` prefix, per spec; a
fixture names exactly one of `successAddress` or `errorAddress` as its
sense address. The variant under test and the per-run instruction
ceiling are CLI concerns (`main.rs`), not part of this JSON shape.
"#]

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarnessConfig {
    pub test_data_path: String,
    pub tests: Vec<FixtureConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureConfig {
    pub name: String,
    pub hex_file: String,
    pub start_address: String,
    #[serde(default)]
    pub success_address: Option<String>,
    #[serde(default)]
    pub error_address: Option<String>,
}

impl HarnessConfig {
    pub fn from_json(source: &str) -> Result<Self, String> {
        serde_json::from_str(source).map_err(|e| format!("invalid harness config: {e}"))
    }
}

impl FixtureConfig {
    /// Path to this fixture's hex image, relative to the config's
    /// `testDataPath`.
    pub fn hex_path(&self, test_data_path: &str) -> std::path::PathBuf {
        std::path::Path::new(test_data_path).join(&self.hex_file)
    }

    pub fn start_address(&self) -> Result<u16, String> {
        parse_hex_address(&self.start_address)
    }

    pub fn success_address(&self) -> Result<Option<u16>, String> {
        self.success_address.as_deref().map(parse_hex_address).transpose()
    }

    pub fn error_address(&self) -> Result<Option<u16>, String> {
        self.error_address.as_deref().map(parse_hex_address).transpose()
    }
}

fn parse_hex_address(s: &str) -> Result<u16, String> {
    u16::from_str_radix(s, 16).map_err(|e| format!("invalid hex address {s:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_config() {
        let json = r#"{
            "testDataPath": "fixtures/",
            "tests": [
                {
                    "name": "example",
                    "hexFile": "example.hex",
                    "startAddress": "8000",
                    "successAddress": "812C"
                }
            ]
        }"#;
        let cfg = HarnessConfig::from_json(json).unwrap();
        assert_eq!(cfg.test_data_path, "fixtures/");
        assert_eq!(cfg.tests.len(), 1);
        let fixture = &cfg.tests[0];
        assert_eq!(fixture.start_address().unwrap(), 0x8000);
        assert_eq!(fixture.success_address().unwrap(), Some(0x812C));
        assert!(fixture.error_address().unwrap().is_none());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(HarnessConfig::from_json("{not json").is_err());
    }

    #[test]
    fn rejects_malformed_hex_address() {
        let fixture = FixtureConfig {
            name: "bad".into(),
            hex_file: "bad.hex".into(),
            start_address: "not-hex".into(),
            success_address: None,
            error_address: None,
        };
        assert!(fixture.start_address().is_err());
    }
}
