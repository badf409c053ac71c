use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::errors::DatasetError;
use crate::graph::LabeledGraph;

/// Environment variable pointing at the directory of dataset CSV files.
pub const DATA_DIR_ENV: &str = "PATHLANG_DATA_DIR";

/// Dataset identifiers the loader resolves to bundled CSV files.
const KNOWN_DATASETS: &[&str] = &["pr", "ls", "pizza", "people", "skos", "wc"];

/// A graph loaded from CSV together with the original vertex names.
///
/// Vertex names are interned in first-appearance order; the dense id of a
/// name is its position in `names`.
#[derive(Debug, Clone)]
pub struct CsvGraph {
    pub graph: LabeledGraph,
    pub names: IndexSet<String>,
}

/// Parses `source,target,label` rows into a graph.
///
/// Blank lines are skipped. Vertex names may be arbitrary strings and are
/// interned to dense ids.
///
/// # Errors
///
/// Returns [`DatasetError::Malformed`] for rows without three fields.
pub fn from_csv_str(text: &str) -> Result<CsvGraph, DatasetError> {
    let mut names: IndexSet<String> = IndexSet::new();
    let mut graph = LabeledGraph::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split(',').map(str::trim);
        let (Some(source), Some(target), Some(label)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(DatasetError::Malformed {
                line: idx + 1,
                message: format!("expected `source,target,label`, got {line:?}"),
            });
        };
        if fields.next().is_some() {
            return Err(DatasetError::Malformed {
                line: idx + 1,
                message: "trailing fields after label".to_owned(),
            });
        }
        let u = names.insert_full(source.to_owned()).0 as u32;
        let v = names.insert_full(target.to_owned()).0 as u32;
        graph.add_edge(u, label, v);
    }
    Ok(CsvGraph { graph, names })
}

/// Reads a CSV graph from disk. See [`from_csv_str`] for the format.
pub fn from_csv_path(path: impl AsRef<Path>) -> Result<CsvGraph, DatasetError> {
    let text = std::fs::read_to_string(path)?;
    from_csv_str(&text)
}

/// Resolves a dataset name to a CSV file below the data directory and loads
/// it. The directory comes from [`DATA_DIR_ENV`], defaulting to `./data`.
///
/// # Errors
///
/// [`DatasetError::UnknownName`] for unregistered identifiers; I/O and
/// format failures propagate from the file read.
pub fn load_dataset(name: &str) -> Result<CsvGraph, DatasetError> {
    if !KNOWN_DATASETS.contains(&name) {
        return Err(DatasetError::UnknownName(name.to_owned()));
    }
    let dir = std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    from_csv_path(dir.join(format!("{name}.csv")))
}
