//! `${dotted.path}` references between settings values.
//!
//! Lets a file name a source or option value once and reuse it across
//! levels. `$$` produces a literal `$`, so `$${x}` survives as `${x}`.

use toml::{Table, Value};

use super::SettingsError;

const MAX_PASSES: usize = 64;

/// Substitutes references until a pass makes no change.
///
/// Each pass reads from a snapshot of the previous one, so chained
/// references settle over several passes. Locations still changing after
/// the last pass are reported as a cycle.
pub fn resolve_references(table: &mut Table) -> Result<(), SettingsError> {
    let mut changed = Vec::new();
    for _ in 0..MAX_PASSES {
        let snapshot = table.clone();
        changed.clear();
        for (key, value) in table.iter_mut() {
            resolve_value(value, key.clone(), &snapshot, &mut changed)?;
        }
        if changed.is_empty() {
            table.iter_mut().for_each(|(_, v)| unescape(v));
            return Ok(());
        }
    }
    Err(SettingsError::CircularReference { at: changed })
}

/// Resolves everything under `value`, recording the location of each
/// string that changed.
fn resolve_value(
    value: &mut Value,
    at: String,
    root: &Table,
    changed: &mut Vec<String>,
) -> Result<(), SettingsError> {
    match value {
        Value::String(s) => {
            if let Some(resolved) = substitute(s, &at, root)? {
                *s = resolved;
                changed.push(at);
            }
        }
        Value::Table(table) => {
            for (key, nested) in table.iter_mut() {
                resolve_value(nested, format!("{at}.{key}"), root, changed)?;
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                resolve_value(item, format!("{at}[{index}]"), root, changed)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Returns the substituted string, or `None` if `input` held no reference.
fn substitute(input: &str, at: &str, root: &Table) -> Result<Option<String>, SettingsError> {
    let mut out = String::with_capacity(input.len());
    let mut substituted = false;
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if let Some(tail) = after.strip_prefix('$') {
            // Escapes stay doubled until every reference has settled.
            out.push_str("$$");
            rest = tail;
        } else if let Some(tail) = after.strip_prefix('{') {
            let end = tail.find('}').ok_or_else(|| SettingsError::UnclosedReference {
                at: at.to_string(),
            })?;
            out.push_str(&lookup(root, &tail[..end], at)?);
            substituted = true;
            rest = &tail[end + 1..];
        } else {
            out.push('$');
            rest = after;
        }
    }
    out.push_str(rest);
    Ok(substituted.then_some(out))
}

fn unescape(value: &mut Value) {
    match value {
        Value::String(s) => *s = s.replace("$$", "$"),
        Value::Table(table) => table.iter_mut().for_each(|(_, v)| unescape(v)),
        Value::Array(items) => items.iter_mut().for_each(unescape),
        _ => {}
    }
}

/// Finds `reference` in `root` and renders it as the text to splice in.
fn lookup(root: &Table, reference: &str, at: &str) -> Result<String, SettingsError> {
    let segments: Vec<&str> = reference.split('.').collect();
    if segments.iter().any(|s| s.trim().is_empty()) {
        return Err(SettingsError::InvalidReferencePath {
            at: at.to_string(),
            reference: reference.to_string(),
        });
    }

    let found = segments[1..]
        .iter()
        .try_fold(root.get(segments[0]), |current, segment| {
            Some(current?.as_table()?.get(*segment))
        })
        .flatten()
        .ok_or_else(|| SettingsError::ReferenceNotFound {
            at: at.to_string(),
            reference: reference.to_string(),
        })?;

    match found {
        Value::String(s) => Ok(s.clone()),
        Value::Table(_) | Value::Array(_) => Err(SettingsError::NonScalarReference {
            at: at.to_string(),
            reference: reference.to_string(),
        }),
        scalar => Ok(scalar.to_string()),
    }
}
