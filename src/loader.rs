// src/loader.rs

//! Reader for whitespace/punctuation separated example files.
//!
//! Each non-blank line is `label f0 f1 ... f{n-1}`. Tokens may be separated
//! by whitespace or any of `(,[])=`, so both `3 0.1 0.2` and `(3, [0.1, 0.2])` parse.

use crate::core::{Dataset, Features, NaiveBayesError, Result};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

const DELIMITERS: &[char] = &[' ', '\t', '(', ',', '[', ']', ')', '='];

#[derive(Debug, Clone, Copy)]
pub struct DatasetLoader {
    num_classes: usize,
    num_features: usize,
    limit: Option<usize>,
}

impl DatasetLoader {
    pub fn new(num_classes: usize, num_features: usize) -> Self {
        DatasetLoader {
            num_classes,
            num_features,
            limit: None,
        }
    }

    /// Stops after `limit` examples.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        debug!("Reading examples from {}", path.display());
        self.load(File::open(path)?)
    }

    pub fn load<R: Read>(&self, reader: R) -> Result<Dataset> {
        let mut labels = Vec::new();
        let mut values = Vec::new();

        for (i, line) in BufReader::new(reader).lines().enumerate() {
            if self.limit.is_some_and(|limit| labels.len() >= limit) {
                break;
            }
            let line = line?;
            let line = line.trim_end_matches('\r');
            let mut tokens = line.split(DELIMITERS).filter(|t| !t.is_empty());
            let Some(label_token) = tokens.next() else {
                continue;
            };
            let line_no = i + 1;
            labels.push(self.parse_label(label_token, line_no, labels.len())?);

            let before = values.len();
            for token in tokens.take(self.num_features) {
                let value: f64 = token.trim().parse().map_err(|_| NaiveBayesError::Parse {
                    line: line_no,
                    message: format!("'{}' is not a number", token),
                })?;
                if !value.is_finite() {
                    return Err(NaiveBayesError::Parse {
                        line: line_no,
                        message: format!("'{}' is not a finite number", token),
                    });
                }
                values.push(value);
            }
            let found = values.len() - before;
            if found < self.num_features {
                return Err(NaiveBayesError::Parse {
                    line: line_no,
                    message: format!("expected {} features, found {}", self.num_features, found),
                });
            }
        }

        debug!("Read {} examples", labels.len());
        let features = Features::from_shape_vec((labels.len(), self.num_features), values)?;
        Dataset::new(labels, features, self.num_classes)
    }

    fn parse_label(&self, token: &str, line: usize, index: usize) -> Result<usize> {
        let raw: i64 = token.trim().parse().map_err(|_| NaiveBayesError::Parse {
            line,
            message: format!("label '{}' is not an integer", token),
        })?;
        match usize::try_from(raw) {
            Ok(label) if label < self.num_classes => Ok(label),
            _ => Err(NaiveBayesError::InvalidLabel {
                index,
                label: raw,
                num_classes: self.num_classes,
            }),
        }
    }
}
