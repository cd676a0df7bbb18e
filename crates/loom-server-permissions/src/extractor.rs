// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Requirement extraction.
//!
//! Turns an action's `permissions` declaration into a [`RequirementSet`]:
//!
//! ```text
//! ActionDef ──permissions_from_action──▶ [PermissionEntry] ──classify──▶ RequirementSet
//!                                          │
//!                                          ├── "$owner"      → Predicate::owner()
//!                                          ├── other string  → names
//!                                          ├── predicate     → predicates
//!                                          └── anything else → dropped
//! ```
//!
//! Extraction runs once, when the action is wrapped.

use crate::action::{ActionDef, PermissionEntry, Permissions};
use crate::config::GuardConfig;
use crate::predicate::{Predicate, OWNER_MARKER};
use std::sync::Arc;

/// The frozen requirements of one action.
///
/// Shared between concurrent invocations without synchronization.
#[derive(Debug, Clone)]
pub struct RequirementSet {
	names: Arc<[String]>,
	predicates: Arc<[Predicate]>,
}

impl RequirementSet {
	pub fn new(names: Vec<String>, predicates: Vec<Predicate>) -> Self {
		Self {
			names: names.into(),
			predicates: predicates.into(),
		}
	}

	pub fn empty() -> Self {
		Self::new(Vec::new(), Vec::new())
	}

	/// Static permission names, in declaration order.
	pub fn names(&self) -> &[String] {
		&self.names
	}

	/// Dynamic predicates, in declaration order.
	pub fn predicates(&self) -> &[Predicate] {
		&self.predicates
	}

	/// An empty set leaves the action unprotected.
	pub fn is_empty(&self) -> bool {
		self.names.is_empty() && self.predicates.is_empty()
	}
}

/// Default `permissions_from_action` strategy.
///
/// `true` yields the canonical action name, a non-empty string yields itself,
/// a list is returned as declared, and everything else yields nothing.
pub fn permissions_from_action(action: &ActionDef, config: &GuardConfig) -> Vec<PermissionEntry> {
	match &action.permissions {
		Permissions::Unset | Permissions::Flag(false) => Vec::new(),
		Permissions::Flag(true) => {
			vec![PermissionEntry::Name(action.canonical_name(&config.permissions_sep))]
		}
		Permissions::Single(name) if name.is_empty() => Vec::new(),
		Permissions::Single(name) => vec![PermissionEntry::Name(name.clone())],
		Permissions::List(entries) => entries.clone(),
	}
}

/// Splits declared entries into names and predicates, preserving order.
pub fn classify<I>(entries: I) -> RequirementSet
where
	I: IntoIterator<Item = PermissionEntry>,
{
	let mut names = Vec::new();
	let mut predicates = Vec::new();

	for entry in entries {
		match entry {
			PermissionEntry::Name(name) if name == OWNER_MARKER => predicates.push(Predicate::owner()),
			PermissionEntry::Name(name) => names.push(name),
			PermissionEntry::Predicate(predicate) => predicates.push(predicate),
			PermissionEntry::Other(value) => {
				tracing::trace!(?value, "ignoring permission entry that is neither a name nor a predicate");
			}
		}
	}

	RequirementSet::new(names, predicates)
}
