use std::path::Path;

use log::{debug, warn};
use thiserror::Error;
use walkdir::WalkDir;

use crate::readers::utils::{has_extension, is_connection_string};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("{0}")]
    Glob(#[from] glob::GlobError),
    #[error("no input matched `{0}`")]
    NoMatch(String),
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Turns input specs into dataset names, in order.
///
/// Connection strings pass through untouched, glob patterns are expanded,
/// directories are walked recursively keeping files with one of
/// `extensions`. Anything else is assumed to be a dataset name.
pub fn expand(inputs: &[String], extensions: &[String]) -> Result<Vec<String>, InputError> {
    let mut names = Vec::new();

    for input in inputs {
        if is_connection_string(input) {
            names.push(input.clone());
        } else if is_pattern(input) {
            let paths = glob::glob(input).map_err(|source| InputError::Pattern {
                pattern: input.clone(),
                source,
            })?;
            let before = names.len();
            for path in paths {
                let path = path?;
                if path.is_file() && has_extension(&path, extensions) {
                    names.push(path.to_string_lossy().to_string());
                }
            }
            if names.len() == before {
                return Err(InputError::NoMatch(input.clone()));
            }
        } else if Path::new(input).is_dir() {
            let mut found: Vec<String> = WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && has_extension(e.path(), extensions))
                .map(|e| e.path().to_string_lossy().to_string())
                .collect();
            found.sort();
            if found.is_empty() {
                warn!("no matching files under {}", input);
            }
            debug!("{}: {} files", input, found.len());
            names.extend(found);
        } else {
            names.push(input.clone());
        }
    }

    Ok(names)
}
