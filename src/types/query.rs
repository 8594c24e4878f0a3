//! Subject identifiers and relation queries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A verified subject identifier, produced by resolving a session.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);

impl Subject {
    /// Creates a subject, rejecting empty identifiers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ory_auth::Subject;
    ///
    /// assert_eq!(Subject::new("user-1").unwrap().as_str(), "user-1");
    /// assert!(Subject::new("").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::session_invalid("identity record has an empty id"));
        }
        Ok(Self(id))
    }

    /// Returns the identifier.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the subject, returning the identifier.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Subject {
    type Error = Error;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<Subject> for String {
    fn from(subject: Subject) -> Self {
        subject.0
    }
}

/// A fully-populated relation check: does `subject` hold `relation` on
/// `object` in `namespace`?
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationQuery {
    namespace: String,
    object: String,
    relation: String,
    subject: String,
}

impl RelationQuery {
    /// Creates a relation query.
    pub fn new(
        namespace: impl Into<String>,
        object: impl Into<String>,
        relation: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            object: object.into(),
            relation: relation.into(),
            subject: subject.into(),
        }
    }

    /// Returns the namespace.
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the object.
    #[inline]
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Returns the relation.
    #[inline]
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Returns the subject id.
    #[inline]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the policy name granted for this query: `namespace/object`.
    pub fn policy(&self) -> String {
        format!("{}/{}", self.namespace, self.object)
    }

    /// Returns the name of the first empty field, if any.
    pub(crate) fn first_empty_field(&self) -> Option<&'static str> {
        [
            ("namespace", &self.namespace),
            ("object", &self.object),
            ("relation", &self.relation),
            ("subject", &self.subject),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
    }
}

impl fmt::Display for RelationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}@{}", self.namespace, self.object, self.relation, self.subject)
    }
}
