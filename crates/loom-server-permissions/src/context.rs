// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request context seen by guarded actions.
//!
//! A [`Context`] is an immutable snapshot: a JSON document (`params`, `meta`,
//! anything else the host puts there) plus an optional handle to the service
//! that owns the action. Cloning is cheap, so every predicate gets its own copy.

use crate::error::BoxError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Optional capability a service exposes to answer `$owner` requirements.
#[async_trait]
pub trait EntityOwner: Send + Sync {
	/// Returns true if the caller in `ctx` owns the entity the action targets.
	async fn is_entity_owner(&self, ctx: &Context) -> Result<bool, BoxError>;
}

/// A service that registers guarded actions.
pub trait Service: Send + Sync {
	fn name(&self) -> &str;

	/// Looks up the ownership capability.
	///
	/// Services that never implement it keep the default, which makes every
	/// `$owner` requirement evaluate to false.
	fn entity_owner(&self) -> Option<&dyn EntityOwner> {
		None
	}
}

/// Immutable request context.
#[derive(Clone, Default)]
pub struct Context {
	document: Arc<Value>,
	service: Option<Arc<dyn Service>>,
}

impl Context {
	/// Creates a context from a JSON document.
	pub fn new(document: Value) -> Self {
		Self {
			document: Arc::new(document),
			service: None,
		}
	}

	/// Creates a context with `params` and `meta` sections.
	pub fn from_parts(params: Value, meta: Value) -> Self {
		let mut document = Map::new();
		document.insert("params".to_string(), params);
		document.insert("meta".to_string(), meta);
		Self::new(Value::Object(document))
	}

	/// Attaches the service that owns the action.
	pub fn with_service(mut self, service: Arc<dyn Service>) -> Self {
		self.service = Some(service);
		self
	}

	/// The whole context document.
	pub fn document(&self) -> &Value {
		&self.document
	}

	pub fn params(&self) -> Option<&Value> {
		self.document.get("params")
	}

	pub fn meta(&self) -> Option<&Value> {
		self.document.get("meta")
	}

	pub fn service(&self) -> Option<&Arc<dyn Service>> {
		self.service.as_ref()
	}

	/// Returns true if both contexts share the same document and service.
	pub fn ptr_eq(&self, other: &Context) -> bool {
		let same_service = match (&self.service, &other.service) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			(None, None) => true,
			_ => false,
		};
		Arc::ptr_eq(&self.document, &other.document) && same_service
	}
}

impl std::fmt::Debug for Context {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Context")
			.field("document", &self.document)
			.field("service", &self.service.as_ref().map(|s| s.name()))
			.finish()
	}
}
