// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission guard middleware for action handlers.
//!
//! # Flow
//!
//! ```text
//! wrap(handler, action)
//!   └── requirements(action) ── empty ──▶ handler (returned as is)
//!                               │
//!                               └── guarded handler, per call:
//!                                     Context → user_permissions → check
//!                                        │                          │
//!                                        │                 Denied ──┴──▶ AuthorizationError
//!                                        └────────── Allowed ──▶ handler(ctx)
//! ```
//!
//! Requirements are computed once, when the action is wrapped.

use crate::action::{ActionDef, PermissionEntry};
use crate::checker::{Decision, PermissionCheck, PermissionChecker};
use crate::config::GuardConfig;
use crate::context::Context;
use crate::error::{AuthorizationError, Diagnostic, Result};
use crate::extractor::{self, RequirementSet};
use crate::path;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Result of an action handler.
pub type ActionResult = Result<Value>;

/// An action handler as registered with the host.
pub type ActionHandler = Arc<dyn Fn(Context) -> BoxFuture<'static, ActionResult> + Send + Sync>;

/// Strategy producing the declared permission entries of an action.
pub type PermissionsFromAction =
	Arc<dyn Fn(&ActionDef, &GuardConfig) -> Vec<PermissionEntry> + Send + Sync>;

/// Strategy reading the caller's permissions from the context.
///
/// Returns `None` when the caller has no permission list.
pub type UserPermissions = Arc<dyn Fn(&Context, &GuardConfig) -> Option<Vec<String>> + Send + Sync>;

/// Builds an [`ActionHandler`] from an async function.
pub fn action_handler<F, Fut>(f: F) -> ActionHandler
where
	F: Fn(Context) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = ActionResult> + Send + 'static,
{
	Arc::new(move |ctx| f(ctx).boxed())
}

/// Default `user_permissions` strategy.
///
/// Resolves `permissions_path` in the context document. Only a JSON array
/// counts as a permission list; non-string elements in it are skipped.
pub fn user_permissions_from_context(ctx: &Context, config: &GuardConfig) -> Option<Vec<String>> {
	let value = path::resolve(&config.permissions_path, ctx.document(), &config.path_separator)?;
	let items = value.as_array()?;
	Some(
		items
			.iter()
			.filter_map(|item| item.as_str().map(str::to_string))
			.collect(),
	)
}

/// Enforces declared permissions before action handlers run.
#[derive(Clone)]
pub struct PermissionGuard {
	config: Arc<GuardConfig>,
	checker: PermissionChecker,
	permissions_from_action: PermissionsFromAction,
	user_permissions: UserPermissions,
}

impl Default for PermissionGuard {
	fn default() -> Self {
		Self::new(GuardConfig::default())
	}
}

impl std::fmt::Debug for PermissionGuard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PermissionGuard")
			.field("config", &self.config)
			.field("checker", &self.checker)
			.finish_non_exhaustive()
	}
}

impl PermissionGuard {
	/// Creates a guard with the built-in strategies.
	pub fn new(config: GuardConfig) -> Self {
		Self {
			config: Arc::new(config),
			checker: PermissionChecker::default(),
			permissions_from_action: Arc::new(extractor::permissions_from_action),
			user_permissions: Arc::new(user_permissions_from_context),
		}
	}

	/// Creates a guard configured from environment variables.
	pub fn from_env() -> Self {
		Self::new(GuardConfig::from_env())
	}

	/// Replace the name-check strategy.
	pub fn with_check_function(mut self, check: impl PermissionCheck + 'static) -> Self {
		self.checker = PermissionChecker::new(check);
		self
	}

	/// Replace the strategy reading declared permissions from an action.
	pub fn with_permissions_from_action<F>(mut self, f: F) -> Self
	where
		F: Fn(&ActionDef, &GuardConfig) -> Vec<PermissionEntry> + Send + Sync + 'static,
	{
		self.permissions_from_action = Arc::new(f);
		self
	}

	/// Replace the strategy reading the caller's permissions.
	pub fn with_user_permissions<F>(mut self, f: F) -> Self
	where
		F: Fn(&Context, &GuardConfig) -> Option<Vec<String>> + Send + Sync + 'static,
	{
		self.user_permissions = Arc::new(f);
		self
	}

	pub fn config(&self) -> &GuardConfig {
		&self.config
	}

	pub fn checker(&self) -> &PermissionChecker {
		&self.checker
	}

	/// Computes the frozen requirement set of `action`.
	pub fn requirements(&self, action: &ActionDef) -> RequirementSet {
		extractor::classify((self.permissions_from_action)(action, &self.config))
	}

	/// The caller's permissions, or `None` if there is no permission list.
	pub fn user_permissions(&self, ctx: &Context) -> Option<Vec<String>> {
		(self.user_permissions)(ctx, &self.config)
	}

	/// Decides `requirements` and turns a denial into an [`AuthorizationError`].
	pub async fn check(
		&self,
		current: Option<&[String]>,
		requirements: &RequirementSet,
		ctx: &Context,
	) -> Result<()> {
		match self
			.checker
			.decide_requirements(current, requirements, ctx)
			.await?
		{
			Decision::Allowed => Ok(()),
			Decision::Denied(diagnostic) => Err(self.denial(diagnostic).into()),
		}
	}

	fn denial(&self, diagnostic: Diagnostic) -> AuthorizationError {
		AuthorizationError::new(diagnostic)
			.with_message(self.config.error_message.clone())
			.with_code(self.config.error_code.clone())
	}

	/// Wraps `handler` so it only runs for callers satisfying `action`'s
	/// permissions.
	///
	/// Actions without requirements get `handler` back unchanged.
	pub fn wrap(&self, handler: ActionHandler, action: &ActionDef) -> ActionHandler {
		let requirements = self.requirements(action);
		if requirements.is_empty() {
			tracing::debug!(action = %action.name, "action has no permission requirements");
			return handler;
		}

		tracing::debug!(
			action = %action.name,
			names = ?requirements.names(),
			predicates = requirements.predicates().len(),
			"guarding action"
		);

		let guard = self.clone();
		let action_name: Arc<str> = action.name.as_str().into();

		Arc::new(move |ctx: Context| {
			let guard = guard.clone();
			let requirements = requirements.clone();
			let handler = handler.clone();
			let action_name = action_name.clone();

			async move {
				let current = guard.user_permissions(&ctx);
				if let Err(err) = guard.check(current.as_deref(), &requirements, &ctx).await {
					if err.is_denied() {
						tracing::info!(action = %action_name, "permission denied");
					}
					return Err(err);
				}
				handler(ctx).await
			}
			.boxed()
		})
	}
}
