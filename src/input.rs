use std::str::FromStr;

use ahash::RandomState;
use nom::{
    character::complete::{alpha1, alphanumeric0, char, multispace0, one_of},
    combinator::{opt, recognize},
    sequence::{pair, preceded, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::operator::{Operator, OperatorError};
use crate::symbol::Symbol;

type IndexMap<K, V> = indexmap::IndexMap<K, V, RandomState>;

/// A YAML process file: a table of field species with their statistics
/// and a set of named operator products.
///
/// ```yaml
/// fields:
///   e: fermion
///   ph: boson
/// processes:
///   tree:
///     external: [e+(p1), e-(p2)]
///     internal: [e+(x), e-(x), ph(x), ph(x)]
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProcessFile {
    #[serde(default)]
    pub fields: IndexMap<String, Statistics>,
    #[serde(default)]
    pub processes: IndexMap<String, ProcessSpec>,
}

#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Statistics {
    Boson,
    Fermion,
}

/// One operator product, split into external legs and internal
/// insertions. Each entry uses the compact notation
/// `species [+|-] ( label )`; a missing charge sigil means a
/// self-conjugate field.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProcessSpec {
    #[serde(default)]
    pub external: Vec<String>,
    #[serde(default)]
    pub internal: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to parse operator: {0}")]
    OperatorParseError(String),
    #[error("Unknown field `{0}`: declare it in the `fields` table")]
    UnknownField(String),
    #[error(transparent)]
    Operator(#[from] OperatorError),
}

impl<'a> From<nom::Err<nom::error::Error<&'a str>>> for ImportError {
    fn from(e: nom::Err<nom::error::Error<&'a str>>) -> Self {
        ImportError::OperatorParseError(e.to_string())
    }
}

/// An operator as written in a process file, before its statistics
/// are known.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct OperatorSpec {
    pub species: Symbol,
    pub charge: i32,
    pub pos: Symbol,
}

impl FromStr for OperatorSpec {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, spec) = operator_spec(s)?;
        if rest.trim_start().is_empty() {
            Ok(spec)
        } else {
            Err(ImportError::OperatorParseError(s.to_owned()))
        }
    }
}

impl ProcessSpec {
    /// Resolve the operator strings against the field table, in file
    /// order: external legs first, then internal insertions.
    pub fn operators(
        &self,
        fields: &IndexMap<String, Statistics>,
    ) -> Result<Vec<Operator>, ImportError> {
        let mut res = Vec::with_capacity(self.external.len() + self.internal.len());
        for (entries, external) in
            [(&self.external, true), (&self.internal, false)]
        {
            for entry in entries {
                let spec: OperatorSpec = entry.parse()?;
                let statistics = fields
                    .get(&spec.species.name())
                    .copied()
                    .ok_or_else(|| {
                        ImportError::UnknownField(spec.species.name())
                    })?;
                res.push(Operator::new(
                    spec.pos,
                    spec.species,
                    spec.charge,
                    statistics == Statistics::Fermion,
                    external,
                )?);
            }
        }
        Ok(res)
    }
}

fn operator_spec(input: &str) -> IResult<&str, OperatorSpec> {
    let (rest, (species, charge, _, pos, _)) = tuple((
        preceded(multispace0, var),
        opt(one_of("+-")),
        preceded(multispace0, char('(')),
        preceded(multispace0, var),
        preceded(multispace0, char(')')),
    ))(input)?;
    let charge = match charge {
        Some('+') => 1,
        Some('-') => -1,
        _ => 0,
    };
    Ok((
        rest,
        OperatorSpec {
            species: Symbol::new(species),
            charge,
            pos: Symbol::new(pos),
        },
    ))
}

fn var(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, alphanumeric0))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols;

    #[test]
    fn parse_operator_spec() {
        symbols!(e, ph, p1, x);

        let spec: OperatorSpec = "e+(p1)".parse().unwrap();
        assert_eq!(spec.species, e);
        assert_eq!(spec.charge, 1);
        assert_eq!(spec.pos, p1);

        let spec: OperatorSpec = "e- (x)".parse().unwrap();
        assert_eq!(spec.charge, -1);
        assert_eq!(spec.pos, x);

        let spec: OperatorSpec = " ph( x )".parse().unwrap();
        assert_eq!(spec.species, ph);
        assert_eq!(spec.charge, 0);

        assert!("e+".parse::<OperatorSpec>().is_err());
        assert!("(x)".parse::<OperatorSpec>().is_err());
        assert!("e+(x) junk".parse::<OperatorSpec>().is_err());
    }

    #[test]
    fn resolve_process() {
        symbols!(e, ph, p1, p2, x);
        let file: ProcessFile = serde_yaml::from_str(
            "fields:
  e: fermion
  ph: boson
processes:
  vertex:
    external: [e+(p1), e-(p2)]
    internal: [ph(x)]
",
        )
        .unwrap();

        let process = &file.processes["vertex"];
        let ops = process.operators(&file.fields).unwrap();
        assert_eq!(ops.len(), 3);

        assert_eq!(ops[0].pos(), p1);
        assert_eq!(ops[0].species(), e);
        assert_eq!(ops[0].charge(), 1);
        assert!(ops[0].is_fermionic());
        assert!(ops[0].is_external());

        assert_eq!(ops[1].pos(), p2);
        assert_eq!(ops[1].charge(), -1);

        assert_eq!(ops[2].pos(), x);
        assert_eq!(ops[2].species(), ph);
        assert!(!ops[2].is_fermionic());
        assert!(!ops[2].is_external());
    }

    #[test]
    fn undeclared_field() {
        let file: ProcessFile = serde_yaml::from_str(
            "processes:
  bad:
    internal: [chi(x), chi(y)]
",
        )
        .unwrap();
        let err = file.processes["bad"].operators(&file.fields).unwrap_err();
        assert!(matches!(err, ImportError::UnknownField(name) if name == "chi"));
    }
}
