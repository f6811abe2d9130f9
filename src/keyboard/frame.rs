use serde::{Deserialize, Serialize};

/// Symbols pressed together, e.g. `["Ctrl", "C"]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyGroup(pub Vec<String>);

impl KeyGroup {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(symbols.into_iter().map(Into::into).collect())
    }

    pub fn symbols(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The complete set of key-groups to display. Each received frame replaces
/// the previous one outright.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeystrokeFrame(pub Vec<KeyGroup>);

impl KeystrokeFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[KeyGroup] {
        &self.0
    }

    pub fn group_count(&self) -> usize {
        self.0.len()
    }

    pub fn key_count(&self) -> usize {
        self.0.iter().map(KeyGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, group: KeyGroup) {
        self.0.push(group);
    }
}

impl FromIterator<KeyGroup> for KeystrokeFrame {
    fn from_iter<T: IntoIterator<Item = KeyGroup>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
