// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the permission guard.
//!
//! Denials are modelled as values ([`crate::Decision`]) inside the checker and
//! only become an [`AuthorizationError`] at the guard boundary. Failures raised
//! by user-supplied strategies, predicates or handlers are carried through
//! untouched.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error raised by user-supplied code (strategies, predicates, handlers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Default error code attached to an [`AuthorizationError`].
pub const DEFAULT_ERROR_CODE: &str = "PERMISSION_ERROR";

/// Alternative error code used by hosts that follow the `ERR_*` naming scheme.
pub const ERR_HAS_NO_ACCESS: &str = "ERR_HAS_NO_ACCESS";

/// Default message attached to an [`AuthorizationError`].
pub const DEFAULT_ERROR_MESSAGE: &str = "Insufficient permissions";

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Diagnostic {
	/// Output of the name-check strategy.
	Check(String),
	/// Results of every predicate, in declaration order.
	Predicates(Vec<bool>),
	/// `decide` was called with neither names nor predicates.
	NoRequirements,
}

impl std::fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Diagnostic::Check(message) => f.write_str(message),
			Diagnostic::Predicates(results) => write!(f, "no predicate passed: {results:?}"),
			Diagnostic::NoRequirements => f.write_str("no requirements declared"),
		}
	}
}

/// Raised when the caller lacks the permissions an action requires.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} ({code}): {data}")]
pub struct AuthorizationError {
	pub message: String,
	pub code: String,
	#[serde(with = "status_code")]
	pub status: StatusCode,
	pub data: Diagnostic,
}

impl AuthorizationError {
	/// Creates an error with the default message and code.
	pub fn new(data: Diagnostic) -> Self {
		Self {
			message: DEFAULT_ERROR_MESSAGE.to_string(),
			code: DEFAULT_ERROR_CODE.to_string(),
			status: StatusCode::UNAUTHORIZED,
			data,
		}
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = message.into();
		self
	}

	pub fn with_code(mut self, code: impl Into<String>) -> Self {
		self.code = code.into();
		self
	}
}

/// Top-level error type for guarded actions.
#[derive(Debug, Error)]
pub enum GuardError {
	#[error(transparent)]
	Authorization(#[from] AuthorizationError),

	/// Check strategy, predicate or ownership capability failed.
	#[error("permission strategy failed: {0}")]
	Strategy(#[source] BoxError),

	/// The wrapped handler failed.
	#[error("action handler failed: {0}")]
	Handler(#[source] BoxError),
}

impl GuardError {
	/// Returns the authorization error if this is a denial.
	pub fn as_authorization(&self) -> Option<&AuthorizationError> {
		match self {
			GuardError::Authorization(err) => Some(err),
			_ => None,
		}
	}

	pub fn is_denied(&self) -> bool {
		self.as_authorization().is_some()
	}
}

mod status_code {
	use http::StatusCode;
	use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

	pub fn serialize<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		status.as_u16().serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
	where
		D: Deserializer<'de>,
	{
		let code = u16::deserialize(deserializer)?;
		StatusCode::from_u16(code).map_err(D::Error::custom)
	}
}
