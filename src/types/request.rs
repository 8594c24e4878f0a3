//! Inbound login request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// Field names accepted on the login path, in validation order.
pub const LOGIN_FIELDS: [&str; 4] = ["session_token", "namespace", "object", "relation"];

/// A login attempt as received from the host.
///
/// All four fields are required and must be non-empty. Missing values are
/// represented as empty strings so the coordinator can reject them before
/// any backing service is contacted.
///
/// ## Example
///
/// ```rust
/// use ory_auth::LoginRequest;
///
/// let request = LoginRequest::new("ory_kratos_session=abc", "files", "report.pdf", "viewer");
/// assert!(request.validate().is_ok());
///
/// let missing = LoginRequest::new("ory_kratos_session=abc", "files", "", "viewer");
/// assert_eq!(missing.validate().unwrap_err().message(), "object is required");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Opaque session token issued by the identity provider.
    #[serde(default)]
    pub session_token: String,
    /// Namespace of the object being logged in against.
    #[serde(default)]
    pub namespace: String,
    /// Object being logged in against.
    #[serde(default)]
    pub object: String,
    /// Relation the subject claims to hold on the object.
    #[serde(default)]
    pub relation: String,
}

impl LoginRequest {
    /// Creates a request from its four fields.
    pub fn new(
        session_token: impl Into<String>,
        namespace: impl Into<String>,
        object: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            session_token: session_token.into(),
            namespace: namespace.into(),
            object: object.into(),
            relation: relation.into(),
        }
    }

    /// Builds a request from the host's named parameters.
    ///
    /// Absent fields and non-string values are treated as empty, which the
    /// coordinator reports as missing.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let field = |name: &str| {
            fields.get(name).and_then(Value::as_str).unwrap_or_default().to_owned()
        };
        Self {
            session_token: field("session_token"),
            namespace: field("namespace"),
            object: field("object"),
            relation: field("relation"),
        }
    }

    /// Checks that every field is present.
    ///
    /// Fields are checked in [`LOGIN_FIELDS`] order; the first empty one is
    /// reported as an `InvalidInput` error naming the field.
    pub fn validate(&self) -> Result<(), Error> {
        let values = [&self.session_token, &self.namespace, &self.object, &self.relation];
        match LOGIN_FIELDS.iter().zip(values).find(|(_, value)| value.is_empty()) {
            Some((name, _)) => Err(Error::invalid_input(format!("{} is required", name))),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("session_token", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("object", &self.object)
            .field("relation", &self.relation)
            .finish()
    }
}
