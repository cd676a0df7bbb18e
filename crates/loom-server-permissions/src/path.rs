// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Nested value lookup by path.
//!
//! Paths are either a separator-delimited string (`meta.user.permissions`) or
//! an explicit list of segments. Lookups never fail: a missing key, an
//! out-of-range index or a scalar in the middle of the path all yield `None`.

use serde_json::Value;

/// Default separator for string paths.
pub const DEFAULT_PATH_SEPARATOR: &str = ".";

/// Resolves a separator-delimited `path` against `root`.
///
/// An empty separator falls back to [`DEFAULT_PATH_SEPARATOR`].
pub fn resolve<'a>(path: &str, root: &'a Value, separator: &str) -> Option<&'a Value> {
	let separator = if separator.is_empty() {
		DEFAULT_PATH_SEPARATOR
	} else {
		separator
	};
	resolve_segments(path.split(separator), root)
}

/// Resolves an explicit list of segments against `root`.
///
/// Objects are indexed by key, arrays by numeric segment.
pub fn resolve_segments<'a, I, S>(segments: I, root: &'a Value) -> Option<&'a Value>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	segments
		.into_iter()
		.try_fold(root, |current, segment| {
			let segment = segment.as_ref();
			match current {
				Value::Object(map) => map.get(segment),
				Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
				_ => None,
			}
		})
		.filter(|value| !value.is_null())
}
