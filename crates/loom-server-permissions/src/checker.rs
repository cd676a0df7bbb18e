// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission decision core.
//!
//! [`PermissionChecker::decide`] evaluates a requirement set against the
//! caller's permissions in two steps:
//!
//! 1. **Name check**: the configured [`PermissionCheck`] strategy compares the
//!    caller's permissions with the required names. A pass ends evaluation.
//! 2. **Predicates**: every predicate is started at once and all of them are
//!    awaited. Any `true` result allows the request.
//!
//! If neither step allows, the decision is [`Decision::Denied`] with the
//! diagnostic from the last step that ran. Decisions are plain values; turning
//! a denial into an error is left to the guard.

use crate::context::Context;
use crate::error::{BoxError, Diagnostic, GuardError, Result};
use crate::extractor::RequirementSet;
use crate::predicate::Predicate;
use async_trait::async_trait;
use futures::future;
use std::sync::Arc;
use tracing::instrument;

/// Result of a name-check strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
	Pass,
	/// Rejected, with a human-readable reason.
	Fail(String),
}

/// Strategy comparing the caller's permissions with required names.
///
/// `current` is `None` when the caller's permissions are missing or not a
/// list.
#[async_trait]
pub trait PermissionCheck: Send + Sync {
	async fn check(
		&self,
		current: Option<&[String]>,
		requested: &[String],
	) -> std::result::Result<CheckOutcome, BoxError>;
}

/// Default strategy: every requested name must be present.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicPermissionCheck;

#[async_trait]
impl PermissionCheck for BasicPermissionCheck {
	async fn check(
		&self,
		current: Option<&[String]>,
		requested: &[String],
	) -> std::result::Result<CheckOutcome, BoxError> {
		Ok(basic_permission_check(current, requested))
	}
}

/// The default name check as a plain function.
///
/// Without a permission list every requested name counts as missing. Missing
/// names are reported in the order they were requested.
pub fn basic_permission_check(current: Option<&[String]>, requested: &[String]) -> CheckOutcome {
	let missing: Vec<&str> = match current {
		Some(current) => requested
			.iter()
			.filter(|p| !current.contains(*p))
			.map(String::as_str)
			.collect(),
		None => requested.iter().map(String::as_str).collect(),
	};

	if missing.is_empty() {
		CheckOutcome::Pass
	} else {
		CheckOutcome::Fail(format!(
			"You lack the permissions required for this action. Missing permissions: {}",
			missing.join(", ")
		))
	}
}

/// Adapts a synchronous function into a [`PermissionCheck`].
pub struct CheckFn<F>(F);

/// Wraps `f` as a check strategy.
pub fn check_fn<F>(f: F) -> CheckFn<F>
where
	F: Fn(Option<&[String]>, &[String]) -> std::result::Result<CheckOutcome, BoxError> + Send + Sync,
{
	CheckFn(f)
}

#[async_trait]
impl<F> PermissionCheck for CheckFn<F>
where
	F: Fn(Option<&[String]>, &[String]) -> std::result::Result<CheckOutcome, BoxError> + Send + Sync,
{
	async fn check(
		&self,
		current: Option<&[String]>,
		requested: &[String],
	) -> std::result::Result<CheckOutcome, BoxError> {
		(self.0)(current, requested)
	}
}

/// Outcome of a permission decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
	Allowed,
	Denied(Diagnostic),
}

impl Decision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allowed)
	}
}

/// Evaluates requirement sets. Holds no per-request state.
#[derive(Clone)]
pub struct PermissionChecker {
	check: Arc<dyn PermissionCheck>,
}

impl Default for PermissionChecker {
	fn default() -> Self {
		Self::new(BasicPermissionCheck)
	}
}

impl std::fmt::Debug for PermissionChecker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PermissionChecker").finish_non_exhaustive()
	}
}

impl PermissionChecker {
	pub fn new(check: impl PermissionCheck + 'static) -> Self {
		Self {
			check: Arc::new(check),
		}
	}

	pub fn from_arc(check: Arc<dyn PermissionCheck>) -> Self {
		Self { check }
	}

	/// Decides whether `current` satisfies the given names or predicates.
	///
	/// At least one of `names` and `predicates` should be non-empty; when both
	/// are empty the request is denied with [`Diagnostic::NoRequirements`].
	///
	/// # Errors
	///
	/// Failures raised by the check strategy or any predicate are returned as
	/// [`GuardError::Strategy`]. A denial is not an error.
	#[instrument(
		level = "debug",
		skip_all,
		fields(names = names.len(), predicates = predicates.len())
	)]
	pub async fn decide(
		&self,
		current: Option<&[String]>,
		names: &[String],
		predicates: &[Predicate],
		ctx: &Context,
	) -> Result<Decision> {
		if names.is_empty() && predicates.is_empty() {
			tracing::warn!("permission decision requested without any requirements");
			return Ok(Decision::Denied(Diagnostic::NoRequirements));
		}

		let mut diagnostic = Diagnostic::NoRequirements;

		if !names.is_empty() {
			match self
				.check
				.check(current, names)
				.await
				.map_err(GuardError::Strategy)?
			{
				CheckOutcome::Pass => {
					tracing::debug!("allowed by permission names");
					return Ok(Decision::Allowed);
				}
				CheckOutcome::Fail(reason) => diagnostic = Diagnostic::Check(reason),
			}
		}

		if !predicates.is_empty() {
			let pending: Vec<_> = predicates.iter().map(|p| p.call(ctx.clone())).collect();
			let results = future::join_all(pending)
				.await
				.into_iter()
				.collect::<std::result::Result<Vec<bool>, BoxError>>()
				.map_err(GuardError::Strategy)?;

			if results.iter().any(|passed| *passed) {
				tracing::debug!(?results, "allowed by predicate");
				return Ok(Decision::Allowed);
			}
			diagnostic = Diagnostic::Predicates(results);
		}

		tracing::debug!(%diagnostic, "permission denied");
		Ok(Decision::Denied(diagnostic))
	}

	/// [`decide`](Self::decide) over a whole requirement set.
	pub async fn decide_requirements(
		&self,
		current: Option<&[String]>,
		requirements: &RequirementSet,
		ctx: &Context,
	) -> Result<Decision> {
		self
			.decide(current, requirements.names(), requirements.predicates(), ctx)
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
	use std::time::Duration;

	fn perms(items: &[&str]) -> Vec<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	fn counting(name: &'static str, answer: bool, calls: Arc<AtomicUsize>) -> Predicate {
		Predicate::from_fn(name, move |_| {
			calls.fetch_add(1, Ordering::SeqCst);
			Ok(answer)
		})
	}

	mod basic_check {
		use super::*;

		#[test]
		fn passes_when_nothing_requested() {
			assert_eq!(basic_permission_check(Some(&[] as &[String]), &[]), CheckOutcome::Pass);
		}

		#[test]
		fn fails_without_permission_list() {
			assert_ne!(basic_permission_check(None, &perms(&["test"])), CheckOutcome::Pass);
		}

		#[test]
		fn fails_on_missing_permission() {
			let outcome = basic_permission_check(Some(perms(&["other"]).as_slice()), &perms(&["test"]));
			assert_ne!(outcome, CheckOutcome::Pass);
		}

		#[test]
		fn passes_on_exact_match() {
			let current = perms(&["test"]);
			assert_eq!(basic_permission_check(Some(current.as_slice()), &perms(&["test"])), CheckOutcome::Pass);
		}

		#[test]
		fn passes_on_superset() {
			let current = perms(&["a", "b"]);
			assert_eq!(basic_permission_check(Some(current.as_slice()), &perms(&["a"])), CheckOutcome::Pass);
		}

		#[test]
		fn reports_only_missing_names() {
			let current = perms(&["a"]);
			let CheckOutcome::Fail(reason) =
				basic_permission_check(Some(current.as_slice()), &perms(&["a", "b"]))
			else {
				panic!("expected failure");
			};
			let listed = reason.rsplit(": ").next().unwrap_or_default();

			assert!(listed.contains('b'));
			assert!(!listed.contains('a'));
		}

		#[test]
		fn keeps_requested_order() {
			let CheckOutcome::Fail(reason) = basic_permission_check(None, &perms(&["z", "m", "a"])) else {
				panic!("expected failure");
			};
			assert!(reason.ends_with("z, m, a"));
		}
	}

	mod decide {
		use super::*;

		#[tokio::test]
		async fn name_pass_skips_predicates() {
			let calls = Arc::new(AtomicUsize::new(0));
			let checker = PermissionChecker::default();
			let current = perms(&["test"]);

			let decision = checker
				.decide(
					Some(current.as_slice()),
					&perms(&["test"]),
					&[counting("p", true, calls.clone())],
					&Context::default(),
				)
				.await
				.unwrap();

			assert_eq!(decision, Decision::Allowed);
			assert_eq!(calls.load(Ordering::SeqCst), 0);
		}

		#[tokio::test]
		async fn no_names_skips_check_function() {
			let called = Arc::new(AtomicBool::new(false));
			let flag = called.clone();
			let checker = PermissionChecker::new(check_fn(move |_, _| {
				flag.store(true, Ordering::SeqCst);
				Ok(CheckOutcome::Pass)
			}));

			let decision = checker
				.decide(None, &[], &[Predicate::from_fn("yes", |_| Ok(true))], &Context::default())
				.await
				.unwrap();

			assert!(decision.is_allowed());
			assert!(!called.load(Ordering::SeqCst));
		}

		#[tokio::test]
		async fn any_true_predicate_allows_and_all_run_once() {
			let first = Arc::new(AtomicUsize::new(0));
			let second = Arc::new(AtomicUsize::new(0));
			let predicates = [
				counting("no", false, first.clone()),
				counting("yes", true, second.clone()),
			];

			let decision = PermissionChecker::default()
				.decide(None, &[], &predicates, &Context::default())
				.await
				.unwrap();

			assert!(decision.is_allowed());
			assert_eq!(first.load(Ordering::SeqCst), 1);
			assert_eq!(second.load(Ordering::SeqCst), 1);
		}

		#[tokio::test]
		async fn waits_for_slow_predicate_after_fast_pass() {
			let finished = Arc::new(AtomicBool::new(false));
			let flag = finished.clone();
			let slow = Predicate::new("slow", move |_| {
				let flag = flag.clone();
				async move {
					tokio::time::sleep(Duration::from_millis(50)).await;
					flag.store(true, Ordering::SeqCst);
					Ok::<_, BoxError>(false)
				}
			});
			let fast = Predicate::from_fn("fast", |_| Ok(true));

			let decision = PermissionChecker::default()
				.decide(None, &[], &[fast, slow], &Context::default())
				.await
				.unwrap();

			assert!(decision.is_allowed());
			assert!(finished.load(Ordering::SeqCst));
		}

		#[tokio::test]
		async fn predicates_run_concurrently() {
			let barrier = Arc::new(tokio::sync::Barrier::new(2));
			let waiting = |name: &'static str| {
				let barrier = barrier.clone();
				Predicate::new(name, move |_| {
					let barrier = barrier.clone();
					async move {
						barrier.wait().await;
						Ok::<_, BoxError>(false)
					}
				})
			};
			let predicates = [waiting("a"), waiting("b")];

			let decision = tokio::time::timeout(
				Duration::from_secs(5),
				PermissionChecker::default().decide(None, &[], &predicates, &Context::default()),
			)
			.await
			.expect("predicates should not be evaluated one after another")
			.unwrap();

			assert_eq!(decision, Decision::Denied(Diagnostic::Predicates(vec![false, false])));
		}

		#[tokio::test]
		async fn denial_carries_check_diagnostic() {
			let decision = PermissionChecker::default()
				.decide(Some(perms(&["a"]).as_slice()), &perms(&["a", "b"]), &[], &Context::default())
				.await
				.unwrap();

			let Decision::Denied(Diagnostic::Check(reason)) = decision else {
				panic!("expected check diagnostic");
			};
			assert!(reason.contains('b'));
		}

		#[tokio::test]
		async fn predicate_results_replace_check_diagnostic() {
			let checker = PermissionChecker::new(check_fn(|_, _| Ok(CheckOutcome::Fail("no".into()))));
			let decision = checker
				.decide(
					None,
					&perms(&["test"]),
					&[Predicate::from_fn("no", |_| Ok(false))],
					&Context::default(),
				)
				.await
				.unwrap();

			assert_eq!(decision, Decision::Denied(Diagnostic::Predicates(vec![false])));
		}

		#[tokio::test]
		async fn custom_check_fail_denies() {
			let checker = PermissionChecker::new(check_fn(|_, _| Ok(CheckOutcome::Fail("nope".into()))));
			let decision = checker
				.decide(None, &perms(&["test"]), &[], &Context::default())
				.await
				.unwrap();

			assert_eq!(decision, Decision::Denied(Diagnostic::Check("nope".into())));
		}

		#[tokio::test]
		async fn empty_requirements_deny() {
			let decision = PermissionChecker::default()
				.decide(Some(perms(&["a"]).as_slice()), &[], &[], &Context::default())
				.await
				.unwrap();

			assert_eq!(decision, Decision::Denied(Diagnostic::NoRequirements));
		}

		#[tokio::test]
		async fn strategy_errors_propagate() {
			let checker = PermissionChecker::new(check_fn(|_, _| Err("backend down".into())));
			let err = checker
				.decide(None, &perms(&["a"]), &[], &Context::default())
				.await
				.unwrap_err();

			assert!(matches!(err, GuardError::Strategy(_)));
		}

		#[tokio::test]
		async fn predicate_errors_propagate() {
			let predicates = [
				Predicate::from_fn("yes", |_| Ok(true)),
				Predicate::from_fn("broken", |_| Err("lookup failed".into())),
			];
			let err = PermissionChecker::default()
				.decide(None, &[], &predicates, &Context::default())
				.await
				.unwrap_err();

			assert!(err.to_string().contains("lookup failed"));
		}
	}

	proptest! {
		/// A caller holding a superset of the requested names always passes.
		#[test]
		fn superset_always_passes(
			requested in proptest::collection::vec("[a-z]{1,5}:[a-z]{1,5}", 0..8),
			extra in proptest::collection::vec("[a-z]{1,5}", 0..8),
		) {
			let mut current = requested.clone();
			current.extend(extra);
			prop_assert_eq!(basic_permission_check(Some(current.as_slice()), &requested), CheckOutcome::Pass);
		}

		/// The diagnostic names every missing permission.
		#[test]
		fn diagnostic_lists_missing(
			held in proptest::collection::vec("[a-z]{3}", 0..5),
			missing in proptest::collection::vec("[A-Z]{3}", 1..5),
		) {
			let mut requested = held.clone();
			requested.extend(missing.iter().cloned());
			let outcome = basic_permission_check(Some(held.as_slice()), &requested);

			let CheckOutcome::Fail(reason) = outcome else {
				return Err(TestCaseError::fail("expected failure"));
			};
			let listed = reason.rsplit(": ").next().unwrap_or_default();
			let listed: Vec<&str> = listed.split(", ").collect();
			let expected: Vec<&str> = missing.iter().map(String::as_str).collect();
			prop_assert_eq!(listed, expected);
		}
	}
}
