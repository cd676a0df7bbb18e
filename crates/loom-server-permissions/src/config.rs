// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Guard configuration.

use crate::error::{DEFAULT_ERROR_CODE, DEFAULT_ERROR_MESSAGE};
use crate::path::DEFAULT_PATH_SEPARATOR;
use serde::{Deserialize, Serialize};

/// Default location of the caller's permissions in the context document.
pub const DEFAULT_PERMISSIONS_PATH: &str = "meta.user.permissions";

/// Default separator joining the segments of a canonical permission name.
pub const DEFAULT_PERMISSIONS_SEP: &str = ":";

pub const PERMISSIONS_PATH_ENV_VAR: &str = "LOOM_SERVER_PERMISSIONS_PATH";
pub const PATH_SEPARATOR_ENV_VAR: &str = "LOOM_SERVER_PERMISSIONS_PATH_SEP";
pub const PERMISSIONS_SEP_ENV_VAR: &str = "LOOM_SERVER_PERMISSIONS_SEP";
pub const ERROR_CODE_ENV_VAR: &str = "LOOM_SERVER_PERMISSIONS_ERROR_CODE";

/// Configuration for [`PermissionGuard`](crate::PermissionGuard).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
	/// Path of the caller's permission list inside the context document.
	pub permissions_path: String,
	/// Separator used to split `permissions_path`.
	pub path_separator: String,
	/// Replaces dots in action names when `permissions = true`.
	pub permissions_sep: String,
	/// Code attached to authorization errors.
	pub error_code: String,
	/// Message attached to authorization errors.
	pub error_message: String,
}

impl Default for GuardConfig {
	fn default() -> Self {
		Self {
			permissions_path: DEFAULT_PERMISSIONS_PATH.to_string(),
			path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
			permissions_sep: DEFAULT_PERMISSIONS_SEP.to_string(),
			error_code: DEFAULT_ERROR_CODE.to_string(),
			error_message: DEFAULT_ERROR_MESSAGE.to_string(),
		}
	}
}

impl GuardConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Create GuardConfig from environment variables.
	///
	/// Unset or empty variables keep their defaults.
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let read = |key: &str| lookup(key).filter(|v| !v.is_empty());
		let defaults = Self::default();

		Self {
			permissions_path: read(PERMISSIONS_PATH_ENV_VAR).unwrap_or(defaults.permissions_path),
			path_separator: read(PATH_SEPARATOR_ENV_VAR).unwrap_or(defaults.path_separator),
			permissions_sep: read(PERMISSIONS_SEP_ENV_VAR).unwrap_or(defaults.permissions_sep),
			error_code: read(ERROR_CODE_ENV_VAR).unwrap_or(defaults.error_code),
			error_message: defaults.error_message,
		}
	}

	pub fn with_permissions_path(mut self, path: impl Into<String>) -> Self {
		self.permissions_path = path.into();
		self
	}

	pub fn with_path_separator(mut self, sep: impl Into<String>) -> Self {
		self.path_separator = sep.into();
		self
	}

	pub fn with_permissions_sep(mut self, sep: impl Into<String>) -> Self {
		self.permissions_sep = sep.into();
		self
	}

	pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
		self.error_code = code.into();
		self
	}

	pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
		self.error_message = message.into();
		self
	}
}
