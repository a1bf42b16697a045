//! Settings sources and how their entries are layered.

use toml::{Table, Value};

use super::SettingsError;
use crate::builder::OptionName;

/// A value contributed by a source, placed at `path` in the merged settings.
///
/// An empty path means the value is a table merged at the root. Numeric
/// segments index arrays, so `["levels", "1", "sources"]` targets the
/// second level.
#[derive(Debug, Clone)]
pub struct SettingsEntry {
    /// Where the entry came from, for error messages.
    pub origin: String,
    pub path: Vec<String>,
    pub value: Value,
}

impl SettingsEntry {
    pub fn root(origin: impl Into<String>, table: Table) -> Self {
        Self {
            origin: origin.into(),
            path: Vec::new(),
            value: Value::Table(table),
        }
    }

    pub fn at_path(origin: impl Into<String>, path: Vec<String>, value: Value) -> Self {
        Self {
            origin: origin.into(),
            path,
            value,
        }
    }
}

/// Anything that can contribute entries to the hierarchy settings.
pub trait SettingsSource: std::fmt::Debug {
    fn entries(&self) -> Result<Vec<SettingsEntry>, SettingsError>;
}

/// Layers `entry` onto `merged`.
///
/// Option names under `options` and `levels[n].options` are rewritten to
/// their canonical spelling first, so a later layer replaces an earlier one
/// however either spells the name. Tables merge key by key; anything else
/// replaces what was there.
pub fn apply_entry(merged: &mut Table, mut entry: SettingsEntry) -> Result<(), SettingsError> {
    canonicalize(&mut entry.path, &mut entry.value);
    insert_at(&entry.origin, merged, &entry.path, entry.value)
}

fn canonicalize(path: &mut [String], value: &mut Value) {
    match path {
        [] => {
            if let Some(options) = value.get_mut("options") {
                canonical_options(options);
            }
            if let Some(Value::Array(levels)) = value.get_mut("levels") {
                levels.iter_mut().for_each(canonical_level);
            }
        }
        [head, rest @ ..] if head.as_str() == "options" => match rest {
            [] => canonical_options(value),
            [name, ..] => *name = canonical_name(name),
        },
        [head, rest @ ..] if head.as_str() == "levels" => match rest {
            [] => {
                if let Value::Array(levels) = value {
                    levels.iter_mut().for_each(canonical_level);
                }
            }
            [_] => canonical_level(value),
            [_, options, tail @ ..] if options.as_str() == "options" => match tail {
                [] => canonical_options(value),
                [name, ..] => *name = canonical_name(name),
            },
            _ => {}
        },
        _ => {}
    }
}

fn canonical_level(level: &mut Value) {
    if let Some(options) = level.get_mut("options") {
        canonical_options(options);
    }
}

fn canonical_options(options: &mut Value) {
    if let Value::Table(table) = options {
        for (name, value) in std::mem::take(table) {
            table.insert(canonical_name(&name), value);
        }
    }
}

/// Unknown names are left alone; the builder reports them.
fn canonical_name(name: &str) -> String {
    name.parse::<OptionName>()
        .map(|known| known.as_str().to_string())
        .unwrap_or_else(|_| name.to_string())
}

fn insert_at(
    origin: &str,
    table: &mut Table,
    path: &[String],
    value: Value,
) -> Result<(), SettingsError> {
    let Some((head, rest)) = path.split_first() else {
        if let Value::Table(overlay) = value {
            deep_merge(table, overlay);
        }
        return Ok(());
    };

    if rest.is_empty() {
        merge_key(table, head.clone(), value);
        return Ok(());
    }

    let slot = table
        .entry(head.clone())
        .or_insert(Value::Table(Table::new()));
    descend(origin, slot, rest, value)
}

fn descend(origin: &str, slot: &mut Value, path: &[String], value: Value) -> Result<(), SettingsError> {
    let Ok(index) = path[0].parse::<usize>() else {
        if !slot.is_table() {
            *slot = Value::Table(Table::new());
        }
        if let Value::Table(table) = slot {
            insert_at(origin, table, path, value)?;
        }
        return Ok(());
    };

    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    let Value::Array(items) = slot else {
        return Ok(());
    };
    if index > items.len() {
        return Err(SettingsError::LevelGap {
            origin: origin.to_string(),
            index,
            depth: items.len(),
        });
    }
    if index == items.len() {
        items.push(Value::Table(Table::new()));
    }

    let item = &mut items[index];
    if path.len() == 1 {
        merge_into(item, value);
        return Ok(());
    }
    if !item.is_table() {
        *item = Value::Table(Table::new());
    }
    if let Value::Table(table) = item {
        insert_at(origin, table, &path[1..], value)?;
    }
    Ok(())
}

fn merge_key(table: &mut Table, key: String, value: Value) {
    match table.get_mut(&key) {
        Some(slot) => merge_into(slot, value),
        None => {
            table.insert(key, value);
        }
    }
}

fn merge_into(slot: &mut Value, value: Value) {
    match (slot, value) {
        (Value::Table(base), Value::Table(overlay)) => deep_merge(base, overlay),
        (slot, value) => *slot = value,
    }
}

fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        merge_key(base, key, value);
    }
}
