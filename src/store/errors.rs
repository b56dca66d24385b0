use ahash::AHashMap;
use std::fmt;

/// A dotted/indexed path to a field of a workflow, e.g. `steps[2].conditions[0].expression.operator`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// A top-level workflow field.
    pub fn workflow(field: &str) -> Self {
        Self(field.to_string())
    }

    pub fn step(index: usize, field: &str) -> Self {
        Self(format!("steps[{}].{}", index, field))
    }

    pub fn condition(step: usize, condition: usize, field: &str) -> Self {
        Self(format!("steps[{}].conditions[{}].{}", step, condition, field))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The step index this path points into, if any.
    pub fn step_index(&self) -> Option<usize> {
        let rest = self.0.strip_prefix("steps[")?;
        let end = rest.find(']')?;
        rest[..end].parse().ok()
    }

    /// The same path with its step index replaced.
    fn with_step_index(&self, index: usize) -> Option<Self> {
        let rest = self.0.strip_prefix("steps[")?;
        let end = rest.find(']')?;
        Some(Self(format!("steps[{}]{}", index, &rest[end + 1..])))
    }

    /// The condition index of a `steps[step].conditions[j]…` path.
    fn condition_index(&self, step: usize) -> Option<usize> {
        let prefix = format!("steps[{}].conditions[", step);
        let rest = self.0.strip_prefix(&prefix)?;
        let end = rest.find(']')?;
        rest[..end].parse().ok()
    }

    fn with_condition_index(&self, step: usize, index: usize) -> Option<Self> {
        let prefix = format!("steps[{}].conditions[", step);
        let rest = self.0.strip_prefix(&prefix)?;
        let end = rest.find(']')?;
        Some(Self(format!("{}{}{}", prefix, index, &rest[end..])))
    }

    /// Whether `self` is `prefix` or lies below it (`steps[1]` covers `steps[1].name`).
    fn is_under(&self, prefix: &FieldPath) -> bool {
        match self.0.strip_prefix(prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
            None => false,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

/// Human-readable validation messages keyed by field path.
///
/// Entries persist until the offending field is edited again; clearing one path never
/// touches the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    entries: AHashMap<FieldPath, String>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: FieldPath, message: impl Into<String>) {
        self.entries.entry(path).or_insert_with(|| message.into());
    }

    pub fn get(&self, path: &FieldPath) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes the entry for `path` and any entry nested below it.
    pub fn clear_path(&mut self, path: &FieldPath) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.is_under(path));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn step_has_errors(&self, index: usize) -> bool {
        self.entries.keys().any(|k| k.step_index() == Some(index))
    }

    /// The lowest step index with at least one entry.
    pub fn first_step_index(&self) -> Option<usize> {
        self.entries.keys().filter_map(FieldPath::step_index).min()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Re-keys step entries after a structural edit. `remap` returns the new index of a
    /// step, or `None` when the step no longer exists (its entries are dropped).
    pub(crate) fn remap_steps(&mut self, remap: impl Fn(usize) -> Option<usize>) {
        self.entries = std::mem::take(&mut self.entries)
            .into_iter()
            .filter_map(|(path, message)| match path.step_index() {
                Some(old) => {
                    let new_path = remap(old).and_then(|new| path.with_step_index(new))?;
                    Some((new_path, message))
                }
                None => Some((path, message)),
            })
            .collect();
    }

    /// Like [`ErrorMap::remap_steps`], for the conditions of one step.
    pub(crate) fn remap_conditions(&mut self, step: usize, remap: impl Fn(usize) -> Option<usize>) {
        self.entries = std::mem::take(&mut self.entries)
            .into_iter()
            .filter_map(|(path, message)| match path.condition_index(step) {
                Some(old) => {
                    let new_path = remap(old).and_then(|new| path.with_condition_index(step, new))?;
                    Some((new_path, message))
                }
                None => Some((path, message)),
            })
            .collect();
    }
}

impl FromIterator<(FieldPath, String)> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = (FieldPath, String)>>(iter: I) -> Self {
        let mut map = ErrorMap::new();
        for (path, message) in iter {
            map.insert(path, message);
        }
        map
    }
}
