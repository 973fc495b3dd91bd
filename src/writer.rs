use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::diagram::Diagram;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum OutFormat {
    Yaml,
    Text,
}

#[derive(Debug, Serialize)]
struct Contraction<'a> {
    multiplicity: i32,
    #[serde(flatten)]
    diagram: &'a Diagram,
}

/// Write all contractions of one process, as a separate YAML document
/// or an indented text block.
pub fn write_process(
    mut out: impl Write,
    name: &str,
    contractions: &[(Diagram, i32)],
    format: OutFormat,
) -> anyhow::Result<()> {
    match format {
        OutFormat::Yaml => {
            let entries: Vec<_> = contractions
                .iter()
                .map(|(diagram, multiplicity)| Contraction {
                    multiplicity: *multiplicity,
                    diagram,
                })
                .collect();
            let mut doc = indexmap::IndexMap::new();
            doc.insert(name, entries);
            writeln!(out, "---")?;
            out.write_all(serde_yaml::to_string(&doc)?.as_bytes())?;
        }
        OutFormat::Text => {
            writeln!(out, "{name}:")?;
            for (diagram, multiplicity) in contractions {
                writeln!(out, "   ({multiplicity:+}) {diagram}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagator::Propagator;
    use crate::symbols;

    #[test]
    fn text_output() {
        symbols!(f, a, b);
        let dia = Diagram::new([a, b], [], vec![Propagator::undirected(f, a, b)]);
        let mut buf = Vec::new();
        write_process(&mut buf, "demo", &[(dia, 1)], OutFormat::Text).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out,
            "demo:\n   (+1) Diagram { outer: [a, b], inner: [], propagators: [f(a --- b)] }\n"
        );
    }
}
