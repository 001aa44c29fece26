//!
//! # Serialization & Deserialization Utilities
//! (and file IO for those serialized objects)
//!

// Std-Lib
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

// Crates.io
use serde::de::DeserializeOwned;
use serde::Serialize;
use textwrap::dedent;
use thiserror::Error;

// Local imports
use crate::enumstr;
use crate::EnumStr;

enumstr!(
    /// # Enumerated First-Class-Supported Serialization Formats
    SerializationFormat {
        Json: "json",
        Yaml: "yaml" | "yml",
        Toml: "toml",
    }
);
impl SerializationFormat {
    /// Infer the format from the extension of `path`.
    /// Accepts `.json`, `.yaml`, `.yml` and `.toml`, ignoring case.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(<Self as EnumStr>::from_str)
            .ok_or_else(|| Error::UnknownFormat(path.display().to_string()))
    }
    /// Convert any [serde::Serialize] data to a compact serialized string
    pub fn to_string(&self, data: &impl Serialize) -> Result<String, Error> {
        match *self {
            Self::Json => Ok(serde_json::to_string(data)?),
            Self::Yaml => Ok(serde_yaml::to_string(data)?),
            Self::Toml => Ok(toml::to_string(data)?),
        }
    }
    /// Convert any [serde::Serialize] data to an indented, human-oriented string.
    /// YAML output is the same as [SerializationFormat::to_string].
    pub fn to_string_pretty(&self, data: &impl Serialize) -> Result<String, Error> {
        match *self {
            Self::Json => Ok(serde_json::to_string_pretty(data)?),
            Self::Yaml => Ok(serde_yaml::to_string(data)?),
            Self::Toml => Ok(toml::to_string_pretty(data)?),
        }
    }
    /// Parse string `s`. Common leading whitespace is removed first,
    /// so indented literals from source code parse as-is.
    pub fn from_str<T: DeserializeOwned>(&self, s: &str) -> Result<T, Error> {
        let s = dedent(s);
        match *self {
            Self::Json => Ok(serde_json::from_str(&s)?),
            Self::Yaml => Ok(serde_yaml::from_str(&s)?),
            Self::Toml => Ok(toml::from_str(&s)?),
        }
    }
    /// Save `data` to file `fname`
    pub fn save(&self, data: &impl Serialize, fname: impl AsRef<Path>) -> Result<(), Error> {
        let s = self.to_string_pretty(data)?;
        let mut file = BufWriter::new(std::fs::File::create(fname)?);
        file.write_all(s.as_bytes())?;
        file.flush()?;
        Ok(())
    }
    /// Load from file at path `fname`
    pub fn open<T: DeserializeOwned>(&self, fname: impl AsRef<Path>) -> Result<T, Error> {
        let file = std::fs::File::open(&fname)?;
        let mut file = BufReader::new(file);
        let rv: T = match *self {
            Self::Json => serde_json::from_reader(file)?,
            Self::Yaml => serde_yaml::from_reader(file)?,
            Self::Toml => {
                // No reader-based TOML decoder; read the whole file
                let mut s = String::new();
                file.read_to_string(&mut s)?;
                toml::from_str(&s)?
            }
        };
        Ok(rv)
    }
}

/// Serialization to & from file trait
///
/// Fully default-implemented, allowing empty implementations
/// for types that implement [serde] serialization and deserialization.
///
pub trait SerdeFile: Serialize + DeserializeOwned {
    /// Save in `fmt`-format to file `fname`
    fn save(&self, fmt: SerializationFormat, fname: impl AsRef<Path>) -> Result<(), Error> {
        fmt.save(self, fname)
    }
    /// Open from `fmt`-format file `fname`
    fn open(fname: impl AsRef<Path>, fmt: SerializationFormat) -> Result<Self, Error> {
        fmt.open(fname)
    }
    /// Open file `fname`, inferring its format from its extension
    fn load(fname: impl AsRef<Path>) -> Result<Self, Error> {
        let fmt = SerializationFormat::from_path(&fname)?;
        fmt.open(fname)
    }
}

/// # Serialization Error
///
/// Wraps the failures of each format's backing crate, plus file IO.
#[derive(Debug, Error)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("TOML encoding error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("TOML decoding error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot infer serialization format of \"{0}\"")]
    UnknownFormat(String),
}
