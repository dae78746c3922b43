use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::VendingConstants;
use crate::errors::{ModelError, Result};

/// Role identifier (usually an IAM role ARN) of the consuming identity.
///
/// Distinct from the coordinating identity that requests the grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GranteeIdentity(String);

impl GranteeIdentity {
    pub fn try_new(role: impl Into<String>) -> Result<Self> {
        let role = role.into();
        if role.trim().is_empty() {
            return Err(ModelError::Empty { field: "grantee" });
        }
        if role.chars().any(char::is_whitespace) {
            return Err(ModelError::InvalidCharacters {
                field: "grantee",
                value: role,
                reason: "whitespace",
            });
        }
        Ok(Self(role))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short role name: the last ARN path segment, or the identifier itself.
    pub fn role_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for GranteeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GranteeIdentity {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_new(value)
    }
}

impl From<GranteeIdentity> for String {
    fn from(value: GranteeIdentity) -> Self {
        value.0
    }
}

/// Correlation tag attached while assuming the grantee role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SessionTagParts")]
pub struct SessionTag {
    key: String,
    value: String,
}

#[derive(Deserialize)]
struct SessionTagParts {
    key: String,
    value: String,
}

impl SessionTag {
    pub fn try_new(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let value = value.into();
        if key.trim().is_empty() {
            return Err(ModelError::Empty { field: "session_tag.key" });
        }
        if value.trim().is_empty() {
            return Err(ModelError::Empty { field: "session_tag.value" });
        }
        Ok(Self { key, value })
    }

    /// Tag with the default `LakeFormationAuthorizedCaller` key.
    pub fn authorized_caller(value: impl Into<String>) -> Result<Self> {
        Self::try_new(VendingConstants::DEFAULT_SESSION_TAG_KEY, value)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl TryFrom<SessionTagParts> for SessionTag {
    type Error = ModelError;

    fn try_from(parts: SessionTagParts) -> Result<Self> {
        Self::try_new(parts.key, parts.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grantee_role_name() {
        let g = GranteeIdentity::try_new("arn:aws:iam::123456789012:role/app-role").unwrap();
        assert_eq!(g.role_name(), "app-role");

        let plain = GranteeIdentity::try_new("app-role").unwrap();
        assert_eq!(plain.role_name(), "app-role");
    }

    #[test]
    fn test_grantee_rejects_blank() {
        assert!(GranteeIdentity::try_new("").is_err());
        assert!(GranteeIdentity::try_new("app role").is_err());
    }

    #[test]
    fn test_session_tag_default_key() {
        let tag = SessionTag::authorized_caller("flow-1").unwrap();
        assert_eq!(tag.key(), "LakeFormationAuthorizedCaller");
        assert_eq!(tag.value(), "flow-1");
        assert!(SessionTag::authorized_caller("").is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let tag: SessionTag = serde_json::from_str(r#"{"key":"k","value":"flow-2"}"#).unwrap();
        assert_eq!(tag.value(), "flow-2");
        assert!(serde_json::from_str::<SessionTag>(r#"{"key":"k","value":"  "}"#).is_err());

        let grantee: GranteeIdentity = serde_json::from_str(r#""app-role""#).unwrap();
        assert_eq!(grantee.as_str(), "app-role");
        assert!(serde_json::from_str::<GranteeIdentity>(r#""app role""#).is_err());
        assert!(serde_json::from_str::<GranteeIdentity>(r#""""#).is_err());
    }
}
