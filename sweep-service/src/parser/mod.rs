// Sweep File Parser
// Parses YAML sweep definitions into an ordered parameter table

pub mod models;

pub use models::{SweepDefinition, SweepParameter, ValueSource};

use crate::discover::discover;
use crate::error::{SetupError, SetupResult};
use crate::execution::space::{ParameterSpace, SpaceBuilder};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors produced while parsing a sweep file
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid sweep file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("parameter '{name}' has an unsupported value (expected scalar, list, or {{glob: pattern}})")]
    InvalidParameter { name: String },

    #[error("parameter names must be strings")]
    NonStringName,

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}

/// Raw file shape as deserialized by serde; normalized into
/// [`SweepDefinition`] afterwards.
#[derive(Debug, Deserialize)]
struct RawSweepFile {
    #[serde(default)]
    name: Option<String>,
    program: String,
    #[serde(default = "default_concurrency")]
    concurrency: usize,
    #[serde(default)]
    log_dir: Option<PathBuf>,
    // serde_yaml's Mapping preserves insertion order, which fixes the
    // argument layout of every generated command line
    #[serde(default)]
    parameters: serde_yaml::Mapping,
}

fn default_concurrency() -> usize {
    1
}

/// Parser for sweep definition files
pub struct SweepParser;

impl SweepParser {
    /// Parse a sweep definition from YAML text
    pub fn parse(content: &str) -> Result<SweepDefinition, ParseError> {
        let raw: RawSweepFile = serde_yaml::from_str(content)?;

        if raw.concurrency == 0 {
            return Err(ParseError::ZeroConcurrency);
        }

        let mut parameters = Vec::with_capacity(raw.parameters.len());
        for (key, value) in &raw.parameters {
            let name = match key.as_str() {
                Some(name) => name.to_string(),
                None => return Err(ParseError::NonStringName),
            };
            let source = parse_value_source(&name, value)?;
            parameters.push(SweepParameter { name, source });
        }

        Ok(SweepDefinition {
            name: raw.name,
            program: raw.program,
            concurrency: raw.concurrency,
            log_dir: raw.log_dir,
            parameters,
        })
    }

    /// Parse a sweep definition from a file on disk
    pub fn from_file(path: &Path) -> SetupResult<SweepDefinition> {
        let content = fs::read_to_string(path).map_err(|source| SetupError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content)?)
    }
}

/// Interpret one parameter's YAML value.
///
/// Scalar → single candidate; sequence → candidate list; `{glob: pattern}` →
/// deferred filesystem discovery. `null` and `""` both mean the empty-string
/// candidate (the flag token is still emitted).
fn parse_value_source(
    name: &str,
    value: &serde_yaml::Value,
) -> Result<ValueSource, ParseError> {
    use serde_yaml::Value;

    if let Some(token) = scalar_token(value) {
        return Ok(ValueSource::List(vec![token]));
    }

    match value {
        Value::Sequence(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match scalar_token(item) {
                    Some(token) => values.push(token),
                    None => {
                        return Err(ParseError::InvalidParameter {
                            name: name.to_string(),
                        })
                    }
                }
            }
            Ok(ValueSource::List(values))
        }
        Value::Mapping(map) => {
            let glob = map
                .get(Value::String("glob".to_string()))
                .and_then(Value::as_str);
            match glob {
                Some(pattern) if map.len() == 1 => Ok(ValueSource::Glob(pattern.to_string())),
                _ => Err(ParseError::InvalidParameter {
                    name: name.to_string(),
                }),
            }
        }
        _ => Err(ParseError::InvalidParameter {
            name: name.to_string(),
        }),
    }
}

/// Convert a YAML scalar to its command-line token
fn scalar_token(value: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

impl SweepDefinition {
    /// Resolve every parameter's value source into a concrete parameter
    /// space, running input discovery for glob-backed parameters.
    pub fn resolve_space(&self) -> SetupResult<ParameterSpace> {
        let mut builder = SpaceBuilder::new();
        for param in &self.parameters {
            let values = match &param.source {
                ValueSource::List(values) => values.clone(),
                ValueSource::Glob(pattern) => discover(pattern)?,
            };
            builder = builder.param(param.name.as_str(), values);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWEEP: &str = r#"
name: orz900d
program: ./build/lns
concurrency: 4
parameters:
  -m: { glob: "map/orz*.map" }
  -o: test
  -k: ["200", "400"]
  -t: 30
  --initLNS: false
  --screen: 0
"#;

    #[test]
    fn test_parse_preserves_declaration_order() {
        let def = SweepParser::parse(SWEEP).unwrap();

        let names: Vec<&str> = def.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["-m", "-o", "-k", "-t", "--initLNS", "--screen"]);
    }

    #[test]
    fn test_parse_value_forms() {
        let def = SweepParser::parse(SWEEP).unwrap();

        assert_eq!(def.name.as_deref(), Some("orz900d"));
        assert_eq!(def.program, "./build/lns");
        assert_eq!(def.concurrency, 4);
        assert_eq!(
            def.parameters[0].source,
            ValueSource::Glob("map/orz*.map".to_string())
        );
        assert_eq!(
            def.parameters[1].source,
            ValueSource::List(vec!["test".to_string()])
        );
        assert_eq!(
            def.parameters[2].source,
            ValueSource::List(vec!["200".to_string(), "400".to_string()])
        );
        // Numbers and booleans stringify
        assert_eq!(
            def.parameters[3].source,
            ValueSource::List(vec!["30".to_string()])
        );
        assert_eq!(
            def.parameters[4].source,
            ValueSource::List(vec!["false".to_string()])
        );
    }

    #[test]
    fn test_null_value_is_empty_token() {
        let def = SweepParser::parse("program: p\nparameters:\n  -o:\n").unwrap();
        assert_eq!(
            def.parameters[0].source,
            ValueSource::List(vec![String::new()])
        );
    }

    #[test]
    fn test_concurrency_defaults_to_one() {
        let def = SweepParser::parse("program: p\n").unwrap();
        assert_eq!(def.concurrency, 1);
        assert!(def.parameters.is_empty());
        assert!(def.log_dir.is_none());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = SweepParser::parse("program: p\nconcurrency: 0\n");
        assert!(matches!(result, Err(ParseError::ZeroConcurrency)));
    }

    #[test]
    fn test_missing_program_rejected() {
        let result = SweepParser::parse("name: x\n");
        assert!(matches!(result, Err(ParseError::Yaml(_))));
    }

    #[test]
    fn test_unsupported_value_rejected() {
        let result = SweepParser::parse("program: p\nparameters:\n  -m: { dir: maps }\n");
        assert!(matches!(
            result,
            Err(ParseError::InvalidParameter { name }) if name == "-m"
        ));
    }

    #[test]
    fn test_resolve_space_literal_values() {
        let def = SweepParser::parse(
            "program: p\nparameters:\n  -a: [\"1\", \"2\"]\n  -b: x\n",
        )
        .unwrap();

        let space = def.resolve_space().unwrap();
        assert_eq!(space.combination_count(), 2);

        let vectors: Vec<String> = space
            .argument_vectors(&def.program)
            .map(|v| v.to_string())
            .collect();
        assert_eq!(vectors, ["p -a 1 -b x", "p -a 2 -b x"]);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.yaml");
        std::fs::write(&path, SWEEP).unwrap();

        let def = SweepParser::from_file(&path).unwrap();
        assert_eq!(def.parameters.len(), 6);

        let missing = SweepParser::from_file(&dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(SetupError::ReadFile { .. })));
    }
}
