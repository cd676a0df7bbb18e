// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dynamic permission predicates.
//!
//! Synchronous and asynchronous predicates are both stored as functions
//! returning a [`BoxFuture`], so the checker never branches on where a result
//! came from.

use crate::context::Context;
use crate::error::BoxError;
use futures::future::{self, BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;

/// Marker that declares an ownership requirement.
pub const OWNER_MARKER: &str = "$owner";

type PredicateFn = dyn Fn(Context) -> BoxFuture<'static, Result<bool, BoxError>> + Send + Sync;

/// A context-dependent permission check.
#[derive(Clone)]
pub struct Predicate {
	name: Arc<str>,
	func: Arc<PredicateFn>,
}

impl Predicate {
	/// Wraps an asynchronous predicate.
	pub fn new<F, Fut>(name: impl Into<Arc<str>>, func: F) -> Self
	where
		F: Fn(Context) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<bool, BoxError>> + Send + 'static,
	{
		Self {
			name: name.into(),
			func: Arc::new(move |ctx| func(ctx).boxed()),
		}
	}

	/// Wraps a synchronous predicate.
	pub fn from_fn<F>(name: impl Into<Arc<str>>, func: F) -> Self
	where
		F: Fn(&Context) -> Result<bool, BoxError> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			func: Arc::new(move |ctx| future::ready(func(&ctx)).boxed()),
		}
	}

	/// The predicate that backs the `$owner` marker.
	///
	/// Delegates to the service's [`EntityOwner`](crate::EntityOwner)
	/// capability. No service, or a service without the capability, means
	/// the caller is not the owner.
	pub fn owner() -> Self {
		Self::new(OWNER_MARKER, |ctx: Context| async move {
			let Some(service) = ctx.service() else {
				return Ok(false);
			};
			match service.entity_owner() {
				Some(owner) => owner.is_entity_owner(&ctx).await,
				None => {
					tracing::debug!(service = service.name(), "service has no ownership capability");
					Ok(false)
				}
			}
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Starts evaluating the predicate against `ctx`.
	pub fn call(&self, ctx: Context) -> BoxFuture<'static, Result<bool, BoxError>> {
		(self.func)(ctx)
	}

	/// Returns true if both handles point at the same function.
	pub fn ptr_eq(&self, other: &Predicate) -> bool {
		Arc::ptr_eq(&self.func, &other.func)
	}
}

impl std::fmt::Debug for Predicate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Predicate").field(&self.name).finish()
	}
}
