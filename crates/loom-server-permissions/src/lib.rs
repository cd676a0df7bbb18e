// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission guard for Loom actions.
//!
//! Actions declare the permissions they require; [`PermissionGuard::wrap`]
//! turns a handler into one that checks the caller first.
//!
//! - [`action`]: action declarations ([`ActionDef`], [`Permissions`])
//! - [`extractor`]: declaration → frozen [`RequirementSet`]
//! - [`checker`]: the decision core ([`PermissionChecker::decide`])
//! - [`middleware`]: [`PermissionGuard`] and handler wrapping
//! - [`predicate`]: dynamic checks, including the `$owner` predicate
//! - [`context`]: request context and the [`EntityOwner`] capability
//! - [`path`]: nested value lookup used to find the caller's permissions
//!
//! # Declaring permissions
//!
//! | `permissions`            | Required                                   |
//! |--------------------------|--------------------------------------------|
//! | unset, `false`, `""`     | nothing; the handler is returned unchanged |
//! | `true`                   | the action name, `posts.update` → `posts:update` |
//! | `"posts:read"`           | that permission                            |
//! | list                     | every listed name, or any predicate returning true |
//!
//! The `$owner` marker in a list asks the service's [`EntityOwner`]
//! capability. Services without it never grant ownership.
//!
//! # Errors
//!
//! A denied call fails with [`GuardError::Authorization`] (status 401) and the
//! handler does not run. Failures from check strategies and predicates are
//! returned as [`GuardError::Strategy`].

pub mod action;
pub mod checker;
pub mod config;
pub mod context;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod path;
pub mod predicate;

pub use action::{ActionDef, PermissionEntry, Permissions};
pub use checker::{
	basic_permission_check, check_fn, BasicPermissionCheck, CheckFn, CheckOutcome, Decision,
	PermissionCheck, PermissionChecker,
};
pub use config::GuardConfig;
pub use context::{Context, EntityOwner, Service};
pub use error::{AuthorizationError, BoxError, Diagnostic, GuardError, Result};
pub use extractor::RequirementSet;
pub use middleware::{
	action_handler, user_permissions_from_context, ActionHandler, ActionResult, PermissionGuard,
};
pub use predicate::{Predicate, OWNER_MARKER};
