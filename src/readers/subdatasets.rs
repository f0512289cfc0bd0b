use std::collections::BTreeMap;

use crate::error::LoadError;

/// A nested dataset listed in a container's `SUBDATASETS` metadata domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subdataset {
    pub index: usize,
    /// Name to hand back to the opener.
    pub name: String,
    pub description: Option<String>,
}

/// Decodes `SUBDATASET_<n>_NAME=...` / `SUBDATASET_<n>_DESC=...` entries,
/// ordered by `n`.
///
/// A name entry without `=`, with an empty value or with more than one `=`
/// is rejected: the name could not be handed back to the opener unchanged.
pub fn parse(entries: &[String]) -> Result<Vec<Subdataset>, LoadError> {
    let mut found: BTreeMap<usize, (Option<String>, Option<String>)> = BTreeMap::new();

    for entry in entries {
        let Some(rest) = entry.strip_prefix("SUBDATASET_") else {
            continue;
        };
        let Some((number, field)) = rest.split_once('_') else {
            continue;
        };
        let Ok(index) = number.parse::<usize>() else {
            continue;
        };

        // The key is everything up to the first `=`
        let (field, value) = match field.split_once('=') {
            Some((field, value)) => (field, Some(value)),
            None => (field, None),
        };

        match field {
            "NAME" => {
                let value = value.ok_or_else(|| LoadError::MalformedSubdataset {
                    entry: entry.clone(),
                    reason: "missing `=`",
                })?;
                if value.contains('=') {
                    return Err(LoadError::MalformedSubdataset {
                        entry: entry.clone(),
                        reason: "too many equal signs in internal filename",
                    });
                }
                if value.is_empty() {
                    return Err(LoadError::MalformedSubdataset {
                        entry: entry.clone(),
                        reason: "empty internal filename",
                    });
                }
                found.entry(index).or_default().0 = Some(value.to_string());
            }
            "DESC" => {
                if let Some(value) = value {
                    found.entry(index).or_default().1 = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    Ok(found
        .into_iter()
        .filter_map(|(index, (name, description))| {
            name.map(|name| Subdataset {
                index,
                name,
                description,
            })
        })
        .collect())
}
