//! Validated group and mark names.

use super::CatalogDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a table group.
///
/// Group names are free text for the extension; the only local rule is that
/// they are not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupName(String);

impl GroupName {
    /// Creates a validated group name. Surrounding whitespace is removed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyGroupName`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CatalogDomainError::EmptyGroupName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a mark within a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkName(String);

impl MarkName {
    /// Creates a validated mark name. Surrounding whitespace is removed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyMarkName`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CatalogDomainError::EmptyMarkName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MarkName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty, duplicate-free set of groups targeted by one operation.
///
/// Insertion order is kept. A selection of exactly one group renders to the
/// single-group variant of an extension function, larger selections to the
/// array variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSelection(Vec<GroupName>);

impl GroupSelection {
    /// Creates a selection from one or more group names.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyGroupSelection`] when `groups` is
    /// empty.
    pub fn new(groups: impl IntoIterator<Item = GroupName>) -> Result<Self, CatalogDomainError> {
        let mut unique: Vec<GroupName> = Vec::new();
        for group in groups {
            if !unique.contains(&group) {
                unique.push(group);
            }
        }
        if unique.is_empty() {
            return Err(CatalogDomainError::EmptyGroupSelection);
        }
        Ok(Self(unique))
    }

    /// Creates a selection holding a single group.
    #[must_use]
    pub fn single(group: GroupName) -> Self {
        Self(vec![group])
    }

    /// Parses a selection from raw names.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError`] when a name is blank or no name is given.
    pub fn parse<I, S>(names: I) -> Result<Self, CatalogDomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups = names
            .into_iter()
            .map(GroupName::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(groups)
    }

    /// Returns the lone group when the selection holds exactly one.
    #[must_use]
    pub fn as_single(&self) -> Option<&GroupName> {
        match self.0.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Returns the selected groups.
    #[must_use]
    pub fn groups(&self) -> &[GroupName] {
        &self.0
    }

    /// Number of selected groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Group names as owned strings, ready to bind as a `text[]` parameter.
    #[must_use]
    pub fn to_names(&self) -> Vec<String> {
        self.0.iter().map(|group| group.as_str().to_owned()).collect()
    }
}

impl fmt::Display for GroupSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_names().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_name_is_trimmed() {
        let name = GroupName::new("  payroll ").expect("valid name");
        assert_eq!(name.as_str(), "payroll");
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(GroupName::new("   "), Err(CatalogDomainError::EmptyGroupName));
        assert_eq!(MarkName::new(""), Err(CatalogDomainError::EmptyMarkName));
    }

    #[test]
    fn selection_removes_duplicates_and_keeps_order() {
        let selection = GroupSelection::parse(["b", "a", "b"]).expect("valid selection");
        assert_eq!(selection.to_names(), vec!["b".to_owned(), "a".to_owned()]);
        assert!(selection.as_single().is_none());
    }

    #[test]
    fn selection_of_one_is_single() {
        let selection = GroupSelection::parse(["a", "a"]).expect("valid selection");
        assert_eq!(selection.as_single().map(GroupName::as_str), Some("a"));
    }

    #[test]
    fn empty_selection_is_rejected() {
        let result = GroupSelection::parse(Vec::<String>::new());
        assert_eq!(result, Err(CatalogDomainError::EmptyGroupSelection));
    }
}
