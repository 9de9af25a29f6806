//! Codec and grouping configuration.
//!
//! All types here are plain data with `Default` impls and Serde support, so a
//! whole [`MultiWriterConfig`] can be built in code or loaded from JSON.

use crate::group::KeyEncoding;
use serde::{Deserialize, Serialize};

/// Field separator understood by both the decoder and the encoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Space,
    Tab,
    #[default]
    Comma,
}

impl Delimiter {
    /// The separator byte handed to the `csv` crate.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Space => b' ',
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

/// Decoder settings.
///
/// Every delimiter implies lenient parsing: records may have any number of
/// fields and stray quotes inside unquoted fields are kept as data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    pub delimiter: Delimiter,
    /// Treat the first record as a header and skip it.
    pub has_headers: bool,
    /// Interpret `"` as a quote character. When off, quotes are plain data.
    pub quoting: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            has_headers: false,
            quoting: true,
        }
    }
}

impl ReaderOptions {
    #[must_use]
    pub fn space() -> Self {
        Self {
            delimiter: Delimiter::Space,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn tab() -> Self {
        Self {
            delimiter: Delimiter::Tab,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn comma() -> Self {
        Self::default()
    }

    pub(crate) fn builder(&self) -> csv::ReaderBuilder {
        let mut b = csv::ReaderBuilder::new();
        b.delimiter(self.delimiter.as_byte())
            .has_headers(self.has_headers)
            .quoting(self.quoting)
            .flexible(true);
        b
    }
}

/// Encoder settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    pub delimiter: Delimiter,
}

impl WriterOptions {
    #[must_use]
    pub fn space() -> Self {
        Self {
            delimiter: Delimiter::Space,
        }
    }

    #[must_use]
    pub fn tab() -> Self {
        Self {
            delimiter: Delimiter::Tab,
        }
    }

    #[must_use]
    pub fn comma() -> Self {
        Self::default()
    }

    pub(crate) fn builder(&self) -> csv::WriterBuilder {
        let mut b = csv::WriterBuilder::new();
        b.delimiter(self.delimiter.as_byte())
            .has_headers(false)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .quote_style(csv::QuoteStyle::Necessary);
        b
    }
}

/// Everything needed to build a [`MultiWriter`](crate::MultiWriter).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiWriterConfig {
    /// Column indices whose values form the group key, in key order.
    pub group_columns: Vec<usize>,
    pub key_encoding: KeyEncoding,
    /// Encoder settings for every storage unit.
    pub writer: WriterOptions,
    /// Name prefix of the temporary backing directory.
    pub temp_prefix: String,
}

impl Default for MultiWriterConfig {
    fn default() -> Self {
        Self {
            group_columns: vec![],
            key_encoding: KeyEncoding::Concatenated,
            writer: WriterOptions::default(),
            temp_prefix: "multi-writer-files".to_string(),
        }
    }
}

impl MultiWriterConfig {
    #[must_use]
    pub fn new(group_columns: impl Into<Vec<usize>>) -> Self {
        Self {
            group_columns: group_columns.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_writer(mut self, writer: WriterOptions) -> Self {
        self.writer = writer;
        self
    }

    #[must_use]
    pub fn with_key_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.key_encoding = encoding;
        self
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
