// TOON input/output
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::request::RawRequest;
use crate::mapping::inventory::{CellInventory, RawCellRow};
use crate::mapping::neighbors::{NeighborGraph, NeighborPair};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("could not encode {what}: {reason}")]
    Encode { what: &'static str, reason: String },

    #[error("row {row}: required field `{field}` is empty")]
    MissingField { row: usize, field: &'static str },
}

/// `{ cells: [...] }`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MasterFile {
    #[serde(default)]
    pub cells: Vec<RawCellRow>,
}

/// `{ areas: [...] }`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NeighborFile {
    #[serde(default)]
    pub areas: Vec<NeighborPair>,
}

/// `{ requests: [...] }`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestFile {
    #[serde(default)]
    pub requests: Vec<RawRequest>,
}

pub fn load_master(path: impl AsRef<Path>) -> Result<CellInventory, LoadError> {
    let file: MasterFile = read_toon(path.as_ref())?;
    for (row, cell) in file.cells.iter().enumerate() {
        if cell.site.trim().is_empty() {
            return Err(LoadError::MissingField { row, field: "site" });
        }
    }
    debug!("master record: {} cells from {}", file.cells.len(), path.as_ref().display());
    Ok(CellInventory::from_rows(file.cells))
}

pub fn load_neighbors(path: impl AsRef<Path>) -> Result<NeighborGraph, LoadError> {
    let file: NeighborFile = read_toon(path.as_ref())?;
    let graph = NeighborGraph::from_pairs(file.areas);
    debug!("neighbor table: {} location codes from {}", graph.len(), path.as_ref().display());
    Ok(graph)
}

pub fn load_requests(path: impl AsRef<Path>) -> Result<Vec<RawRequest>, LoadError> {
    let file: RequestFile = read_toon(path.as_ref())?;
    for (row, req) in file.requests.iter().enumerate() {
        if req.site.trim().is_empty() {
            return Err(LoadError::MissingField { row, field: "site" });
        }
        if req.band.trim().is_empty() {
            return Err(LoadError::MissingField { row, field: "band" });
        }
    }
    Ok(file.requests)
}

pub fn read_toon<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toon_format::decode_default(&text).map_err(|e| LoadError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub fn to_toon<T: Serialize>(what: &'static str, value: &T) -> Result<String, LoadError> {
    toon_format::encode_default(value).map_err(|e| LoadError::Encode {
        what,
        reason: e.to_string(),
    })
}

pub fn write_toon<T: Serialize>(path: &Path, what: &'static str, value: &T) -> Result<(), LoadError> {
    let text = to_toon(what, value)?;
    fs::write(path, text).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Hand-written tables often leave codes unquoted, so `100` arrives as a
/// number; accept any scalar and keep its text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

pub(crate) fn text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Scalar::deserialize(de).map(Scalar::into_text)
}

pub(crate) fn opt_text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(de)?.map(Scalar::into_text))
}
