//! Labelled variables and their measurement scales.
//!
//! An [`Observable`] binds a name to a mapping from row keys to values and
//! classifies the values into nominal, ordinal or continuous scale when it is
//! built. The classification never changes afterwards.
//!
//! # Example
//!
//! ```rust
//! use statquest::observable::{Observable, Scale};
//!
//! let height = Observable::new("height", [(1, 10.5), (2, 10.2), (3, 11.5)]).unwrap();
//! assert!(height.is_continuous());
//! assert!(!height.is_ordinal());
//! assert_eq!(height.scale(), Scale::Continuous);
//!
//! let answer = Observable::new("answer", [(1, "yes"), (2, "maybe"), (3, "no")]).unwrap();
//! assert!(answer.is_nominal());
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QuestError, Result};

mod descriptive;
mod value;

pub use descriptive::DescriptiveStatistics;
pub use value::{Key, Value};

/// The three scale flags of an observable.
///
/// `is_ordinal` and `is_continuous` may both hold (integers are valid reals);
/// `is_nominal` holds only when neither does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleFlags {
    pub is_ordinal: bool,
    pub is_continuous: bool,
    pub is_nominal: bool,
}

/// The scale used to describe an observable, ordinal taking precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Nominal,
    Ordinal,
    Continuous,
}

impl Scale {
    pub fn name(&self) -> &'static str {
        match self {
            Scale::Nominal => "nominal",
            Scale::Ordinal => "ordinal",
            Scale::Continuous => "continuous",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ScaleFlags {
    /// Returns the authoritative scale for display and reporting.
    pub fn scale(&self) -> Scale {
        if self.is_ordinal {
            Scale::Ordinal
        } else if self.is_continuous {
            Scale::Continuous
        } else {
            Scale::Nominal
        }
    }

    /// Nominal or ordinal data can be used as categories.
    pub fn is_categorical(&self) -> bool {
        self.is_nominal || self.is_ordinal
    }

    /// Ordinal or continuous data can be ranked and correlated.
    pub fn is_numeric(&self) -> bool {
        self.is_ordinal || self.is_continuous
    }
}

/// Classifies a collection of values.
///
/// Ordinal iff every value survives the integer round trip, continuous iff
/// every value survives the float round trip, nominal otherwise. An empty
/// collection has no scale and yields `None`.
pub fn classify<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<ScaleFlags> {
    let mut seen = false;
    let mut is_ordinal = true;
    let mut is_continuous = true;
    for value in values {
        seen = true;
        is_ordinal &= value.as_integer().is_some();
        is_continuous &= value.as_float().is_some();
        if !is_ordinal && !is_continuous {
            break;
        }
    }
    seen.then_some(ScaleFlags {
        is_ordinal,
        is_continuous,
        is_nominal: !is_ordinal && !is_continuous,
    })
}

/// Returns the distinct values in ascending order, or in first-seen order when
/// some of them are not mutually comparable.
pub(crate) fn distinct_sorted<'a>(values: impl IntoIterator<Item = &'a Value>) -> Vec<Value> {
    let mut distinct: Vec<Value> = Vec::new();
    let mut seen: HashSet<&Value> = HashSet::new();
    for value in values {
        if seen.insert(value) {
            distinct.push(value.clone());
        }
    }
    sort_if_orderable(&mut distinct, |v| v);
    distinct
}

/// Maps each distinct value to its position in [`distinct_sorted`] order.
pub(crate) fn rank_index(sorted: &[Value]) -> HashMap<Value, usize> {
    sorted
        .iter()
        .enumerate()
        .map(|(i, value)| (value.clone(), i))
        .collect()
}

fn sort_if_orderable<T>(items: &mut [T], value_of: impl Fn(&T) -> &Value) {
    // numeric text ("9", "10") sorts by its number, not lexicographically
    if items.iter().all(|item| value_of(item).as_float().is_some()) {
        items.sort_by(|a, b| {
            let (x, y) = (value_of(a), value_of(b));
            x.as_float()
                .partial_cmp(&y.as_float())
                .unwrap_or(Ordering::Equal)
                .then_with(|| x.partial_cmp(y).unwrap_or(Ordering::Equal))
        });
        return;
    }
    // numbers and texts do not compare with each other
    if items
        .iter()
        .all(|item| matches!(value_of(item), Value::Text(_)))
    {
        items.sort_by(|a, b| {
            value_of(a)
                .partial_cmp(value_of(b))
                .unwrap_or(Ordering::Equal)
        });
    }
}

/// A labelled variable: a name, keyed values, and their scale.
#[derive(Debug, Clone)]
pub struct Observable {
    name: String,
    data: BTreeMap<Key, Value>,
    flags: ScaleFlags,
}

impl Observable {
    /// Builds and classifies an observable.
    ///
    /// Missing entries must already be removed. A later pair with a repeated
    /// key replaces the earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Classification`] when no value is given or when a
    /// value is a NaN.
    pub fn new<K, V>(name: impl Into<String>, data: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: Into<Key>,
        V: Into<Value>,
    {
        let name = name.into();
        let data: BTreeMap<Key, Value> = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if let Some((key, _)) = data.iter().find(|(_, v)| v.is_missing()) {
            return Err(QuestError::classification(
                name,
                format!("missing value at key {key}"),
            ));
        }
        let flags = classify(data.values())
            .ok_or_else(|| QuestError::classification(name.clone(), "no values"))?;

        Ok(Self { name, data, flags })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &BTreeMap<Key, Value> {
        &self.data
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: an observable without values cannot be built.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn flags(&self) -> ScaleFlags {
        self.flags
    }

    pub fn scale(&self) -> Scale {
        self.flags.scale()
    }

    pub fn is_ordinal(&self) -> bool {
        self.flags.is_ordinal
    }

    pub fn is_continuous(&self) -> bool {
        self.flags.is_continuous
    }

    pub fn is_nominal(&self) -> bool {
        self.flags.is_nominal
    }

    /// Counts occurrences of each distinct value.
    ///
    /// Entries are sorted by value when the values are mutually comparable and
    /// otherwise keep the order in which values first appear (by key).
    ///
    /// ```rust
    /// use statquest::observable::{Observable, Value};
    ///
    /// let obs = Observable::new("blood", [(1, "A"), (2, "B"), (3, "A")]).unwrap();
    /// assert_eq!(
    ///     obs.frequency_table(),
    ///     vec![(Value::from("A"), 2), (Value::from("B"), 1)]
    /// );
    /// ```
    pub fn frequency_table(&self) -> Vec<(Value, usize)> {
        let mut table: Vec<(Value, usize)> = Vec::new();
        let mut position: HashMap<&Value, usize> = HashMap::new();
        for value in self.data.values() {
            match position.get(value) {
                Some(&i) => table[i].1 += 1,
                None => {
                    position.insert(value, table.len());
                    table.push((value.clone(), 1));
                }
            }
        }
        sort_if_orderable(&mut table, |(v, _)| v);
        table
    }

    /// Distinct values in ascending order.
    ///
    /// Text that reads as a number is ordered numerically, so `"9"` comes
    /// before `"10"`.
    pub fn values_as_sorted_list(&self) -> Vec<Value> {
        distinct_sorted(self.data.values())
    }

    /// Maps each distinct value to its 0-based rank in
    /// [`values_as_sorted_list`](Self::values_as_sorted_list).
    pub fn values_to_indices(&self) -> HashMap<Value, usize> {
        rank_index(&self.values_as_sorted_list())
    }

    pub fn distinct_count(&self) -> usize {
        self.values_as_sorted_list().len()
    }

    /// Sorted distinct values rendered as text.
    pub fn nominals(&self) -> Vec<String> {
        self.values_as_sorted_list()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Sorted distinct integers; `None` unless the observable is ordinal.
    pub fn ordinals(&self) -> Option<Vec<i64>> {
        if !self.is_ordinal() {
            return None;
        }
        let mut ordinals: Vec<i64> = self
            .data
            .values()
            .filter_map(Value::as_integer)
            .collect();
        ordinals.sort_unstable();
        ordinals.dedup();
        Some(ordinals)
    }

    /// Keys present in both observables, in ascending order.
    pub fn shared_keys<'a>(&'a self, other: &Observable) -> Vec<&'a Key> {
        self.data
            .keys()
            .filter(|key| other.data.contains_key(*key))
            .collect()
    }

    /// Value pairs for the keys present in both observables.
    pub fn aligned_values<'a>(&'a self, other: &'a Observable) -> Vec<(&'a Value, &'a Value)> {
        self.data
            .iter()
            .filter_map(|(key, value)| other.data.get(key).map(|o| (value, o)))
            .collect()
    }

    /// Summary statistics for ordinal or continuous data; `None` for nominal.
    pub fn descriptive_statistics(&self) -> Option<DescriptiveStatistics> {
        if !self.flags.is_numeric() {
            return None;
        }
        let values: Vec<f64> = self.data.values().filter_map(Value::as_float).collect();
        DescriptiveStatistics::from_values(&values)
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
