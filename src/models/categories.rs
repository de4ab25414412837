//! Job-category filter.

use serde::{Deserialize, Deserializer, Serialize};

/// Ordered set of site-defined job-function codes.
///
/// Keeps the caller's order and drops repeats; the wire form is the
/// comma-joined list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Categories(Vec<u32>);

impl Categories {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma-joined ids, unescaped.
    pub fn to_csv(&self) -> String {
        self.0
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<Vec<u32>> for Categories {
    fn from(ids: Vec<u32>) -> Self {
        ids.into_iter().collect()
    }
}

impl FromIterator<u32> for Categories {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut ids = Vec::new();
        for id in iter {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Self(ids)
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<u32>::deserialize(deserializer).map(Self::from)
    }
}
