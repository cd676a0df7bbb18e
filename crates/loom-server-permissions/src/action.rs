// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Action declarations.

use crate::predicate::Predicate;
use serde_json::Value;

/// One element of a declared permission list.
#[derive(Debug, Clone)]
pub enum PermissionEntry {
	/// A permission name, or the `$owner` marker.
	Name(String),
	Predicate(Predicate),
	/// Anything else. Ignored during extraction.
	Other(Value),
}

impl From<&str> for PermissionEntry {
	fn from(name: &str) -> Self {
		PermissionEntry::Name(name.to_string())
	}
}

impl From<String> for PermissionEntry {
	fn from(name: String) -> Self {
		PermissionEntry::Name(name)
	}
}

impl From<Predicate> for PermissionEntry {
	fn from(predicate: Predicate) -> Self {
		PermissionEntry::Predicate(predicate)
	}
}

impl From<Value> for PermissionEntry {
	fn from(value: Value) -> Self {
		match value {
			Value::String(name) => PermissionEntry::Name(name),
			other => PermissionEntry::Other(other),
		}
	}
}

/// The `permissions` field of an action declaration.
#[derive(Debug, Clone, Default)]
pub enum Permissions {
	#[default]
	Unset,
	/// `true` requires the canonical action name; `false` leaves it open.
	Flag(bool),
	Single(String),
	List(Vec<PermissionEntry>),
}

impl Permissions {
	/// Builds a list from anything convertible into entries.
	pub fn list<I, E>(entries: I) -> Self
	where
		I: IntoIterator<Item = E>,
		E: Into<PermissionEntry>,
	{
		Permissions::List(entries.into_iter().map(Into::into).collect())
	}
}

impl From<bool> for Permissions {
	fn from(flag: bool) -> Self {
		Permissions::Flag(flag)
	}
}

impl From<&str> for Permissions {
	fn from(name: &str) -> Self {
		Permissions::Single(name.to_string())
	}
}

impl From<Vec<PermissionEntry>> for Permissions {
	fn from(entries: Vec<PermissionEntry>) -> Self {
		Permissions::List(entries)
	}
}

/// A protected operation as registered by a service.
#[derive(Debug, Clone)]
pub struct ActionDef {
	/// Dotted action name, e.g. `posts.update`.
	pub name: String,
	pub permissions: Permissions,
}

impl ActionDef {
	/// Declares an action with no permission requirements.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			permissions: Permissions::Unset,
		}
	}

	pub fn with_permissions(mut self, permissions: impl Into<Permissions>) -> Self {
		self.permissions = permissions.into();
		self
	}

	/// The action name with dots replaced by `sep`.
	pub fn canonical_name(&self, sep: &str) -> String {
		self.name.replace('.', sep)
	}
}
