//! Structural validation of the request tree.
//!
//! Checks run in a fixed order and the first violation wins:
//!
//! 1. shape (version, ids)
//! 2. per-item type rules (a request listing itself reports the self
//!    reference, ahead of its other field rules)
//! 3. self references and root typing, in one pass over all children
//! 4. dangling child references
//! 5. folder depth, walked from every root, with cycle detection

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ValidationError, ValidationResult};
use crate::item::{HttpMethod, Item, ItemType};
use crate::requests::RequestsConfig;

/// Maximum number of chained folder levels.
///
/// Root folders sit at depth 0, so folders at depth 0, 1 and 2 are allowed
/// and a folder at depth 3 is rejected.
pub const MAX_FOLDER_DEPTH: usize = 3;

/// Validates a proposed configuration, returning the first violation.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate(config: &RequestsConfig) -> ValidationResult {
    validate_shape(config)?;

    for (id, item) in &config.values {
        validate_item(id, item)?;
    }

    let referenced = validate_references_and_roots(&config.values)?;

    for (parent, item) in &config.values {
        if let Some(child) = item
            .children
            .iter()
            .find(|child| !config.values.contains_key(child.as_str()))
        {
            return Err(ValidationError::MissingReference {
                parent: parent.clone(),
                child: child.clone(),
            });
        }
    }

    validate_depth(&config.values, &referenced)
}

fn validate_shape(config: &RequestsConfig) -> ValidationResult {
    if config.version < 1 {
        return Err(ValidationError::InvalidVersion {
            found: config.version,
        });
    }
    if config.values.keys().any(String::is_empty) {
        return Err(ValidationError::EmptyId);
    }
    Ok(())
}

/// Rules that depend only on a single item and its type.
///
/// # Errors
///
/// Returns the violated rule for `id`.
pub fn validate_item(id: &str, item: &Item) -> ValidationResult {
    let id_owned = || id.to_string();

    if item.name.trim().is_empty() {
        return Err(ValidationError::EmptyName { id: id_owned() });
    }

    match item.item_type {
        ItemType::Request => {
            if item.children.iter().any(|child| child == id) {
                return Err(ValidationError::SelfReference { id: id_owned() });
            }
            if !item.children.is_empty() {
                return Err(ValidationError::RequestWithChildren { id: id_owned() });
            }
            let Some(method) = item.method() else {
                return Err(ValidationError::MissingMethod { id: id_owned() });
            };
            if method.parse::<HttpMethod>().is_err() {
                return Err(ValidationError::UnknownMethod {
                    id: id_owned(),
                    method: method.to_string(),
                });
            }
            if item.path().is_none() {
                return Err(ValidationError::MissingPath { id: id_owned() });
            }
        }
        ItemType::Folder => {
            if item.method().is_some() {
                return Err(ValidationError::FolderWithMethod { id: id_owned() });
            }
            if item.path().is_some() {
                return Err(ValidationError::FolderWithPath { id: id_owned() });
            }
        }
    }
    Ok(())
}

/// Collects referenced ids, rejecting self references and non-folder roots.
fn validate_references_and_roots(
    values: &BTreeMap<String, Item>,
) -> ValidationResult<BTreeSet<&str>> {
    let mut referenced = BTreeSet::new();
    for (id, item) in values {
        for child in &item.children {
            if child == id {
                return Err(ValidationError::SelfReference { id: id.clone() });
            }
            referenced.insert(child.as_str());
        }
    }

    if let Some((id, _)) = values
        .iter()
        .find(|(id, item)| !referenced.contains(id.as_str()) && !item.is_folder())
    {
        return Err(ValidationError::RootNotFolder { id: id.clone() });
    }

    Ok(referenced)
}

struct DepthWalk<'a> {
    values: &'a BTreeMap<String, Item>,
    visiting: BTreeSet<&'a str>,
    reached: BTreeSet<&'a str>,
}

impl<'a> DepthWalk<'a> {
    fn visit(&mut self, id: &'a str, depth: usize) -> ValidationResult {
        let Some(item) = self.values.get(id) else {
            return Ok(());
        };
        self.reached.insert(id);
        if !item.is_folder() {
            return Ok(());
        }
        if depth >= MAX_FOLDER_DEPTH {
            return Err(ValidationError::MaxDepthExceeded {
                id: id.to_string(),
                max: MAX_FOLDER_DEPTH,
            });
        }

        self.visiting.insert(id);
        for child_id in &item.children {
            let child_id = child_id.as_str();
            if self.visiting.contains(child_id) {
                return Err(ValidationError::Cycle {
                    id: child_id.to_string(),
                });
            }
            let Some(child) = self.values.get(child_id) else {
                continue;
            };
            let next_depth = if child.is_folder() { depth + 1 } else { depth };
            self.visit(child_id, next_depth)?;
        }
        self.visiting.remove(id);
        Ok(())
    }
}

fn validate_depth(values: &BTreeMap<String, Item>, referenced: &BTreeSet<&str>) -> ValidationResult {
    let mut walk = DepthWalk {
        values,
        visiting: BTreeSet::new(),
        reached: BTreeSet::new(),
    };

    for id in values.keys().map(String::as_str) {
        if !referenced.contains(id) {
            walk.visit(id, 0)?;
        }
    }

    // Anything still unreached hangs off a parent chain that never meets a root.
    if let Some(id) = values
        .keys()
        .find(|id| !walk.reached.contains(id.as_str()))
    {
        return Err(ValidationError::Cycle { id: id.clone() });
    }
    Ok(())
}
