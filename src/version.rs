/// A version labels a set of data files with a common generation history,
/// e.g. the model family that produced them.
///
/// Versions are identified by label alone; the description is free text
/// attached when the version row is first created.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct Version {
    pub label: String,
    pub description: Option<String>,
}

impl Version {
    /// Create a version with a label and no description.
    pub fn new(label: &str) -> Version {
        Version {
            label: label.to_owned(),
            description: None,
        }
    }
}

/// A version paired with its catalog row id.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRecord {
    pub id: i64,
    pub version: Version,
}
