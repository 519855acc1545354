//! Secrets loaded from configuration.
//!
//! A secret is either written inline (`{"type": "plain", "value": "..."}`) or referenced by the
//! name of an environment variable (`{"type": "environment", "value": "SLACK_WEBHOOK_URL"}`).
//! Resolved values live in a [`SecretString`], which is zeroized on drop and redacted in `Debug`.

use serde::{Serialize, Serializer};
use std::{env, fmt};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
	impl_case_insensitive_enum,
	models::security::error::{SecurityError, SecurityResult},
};

/// Where a secret comes from
#[derive(Clone, Serialize, ZeroizeOnDrop)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SecretValue {
	/// The secret itself
	Plain(SecretString),
	/// Name of the environment variable holding the secret
	Environment(String),
}

impl_case_insensitive_enum!(SecretValue, {
	"plain" => Plain,
	"environment" => Environment,
});

impl SecretValue {
	/// Returns the secret, reading the environment when needed.
	pub fn resolve(&self) -> SecurityResult<SecretString> {
		match self {
			SecretValue::Plain(secret) => Ok(secret.clone()),
			SecretValue::Environment(name) => env::var(name).map(SecretString::new).map_err(|e| {
				Box::new(SecurityError::parse_error(
					format!("Failed to get environment variable {}", name),
					Some(e.into()),
					None,
				))
			}),
		}
	}

	/// True when the inline value or the variable name is blank
	pub fn is_empty(&self) -> bool {
		match self {
			SecretValue::Plain(secret) => secret.as_str().trim().is_empty(),
			SecretValue::Environment(name) => name.trim().is_empty(),
		}
	}
}

impl PartialEq for SecretValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Plain(l), Self::Plain(r)) => l == r,
			(Self::Environment(l), Self::Environment(r)) => l == r,
			_ => false,
		}
	}
}

impl fmt::Debug for SecretValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SecretValue::Plain(_) => f.write_str("Plain(<redacted>)"),
			SecretValue::Environment(name) => write!(f, "Environment({})", name),
		}
	}
}

impl Zeroize for SecretValue {
	fn zeroize(&mut self) {
		match self {
			SecretValue::Plain(secret) => secret.zeroize(),
			SecretValue::Environment(name) => name.zeroize(),
		}
	}
}

/// String that is wiped from memory when dropped
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
	pub fn new(value: String) -> Self {
		Self(value)
	}

	/// Exposes the secret. Do not store the returned reference.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl AsRef<str> for SecretString {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("<redacted>")
	}
}

impl Serialize for SecretString {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.0)
	}
}
