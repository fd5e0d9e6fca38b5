//! Identifier resolution against the live catalog
//!
//! Tokens that already name a repository (`ai/smollm2`, `ai/smollm2:latest`) are used as-is.
//! Anything else is looked up in a freshly fetched listing using [`MATCHERS`], in order, per
//! entry. The first entry any matcher accepts wins.

use std::future::Future;

use tracing::debug;

use crate::{
    error::ClientError,
    models::{Model, ModelList},
    Result,
};

/// Algorithm prefix of content identifiers
pub const DIGEST_PREFIX: &str = "sha256:";

/// Byte range of a content identifier used as its short form
pub const SHORT_ID_RANGE: std::ops::Range<usize> = 7..19;

/// A named predicate over (canonical id, token)
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    pub name: &'static str,
    pub matches: fn(&str, &str) -> bool,
}

/// Matchers tried against each catalog entry, in order
pub const MATCHERS: &[Matcher] = &[
    Matcher {
        name: "exact",
        matches: exact_id,
    },
    Matcher {
        name: "digest",
        matches: digest_without_prefix,
    },
    Matcher {
        name: "short-id",
        matches: short_id,
    },
];

/// The token is the full content identifier
pub fn exact_id(id: &str, token: &str) -> bool {
    id == token
}

/// The token is the content identifier without `sha256:`
pub fn digest_without_prefix(id: &str, token: &str) -> bool {
    id.strip_prefix(DIGEST_PREFIX) == Some(token)
}

/// The token is the 12-character short form. Identifiers too short to have one never match.
pub fn short_id(id: &str, token: &str) -> bool {
    id.get(SHORT_ID_RANGE) == Some(token)
}

/// Repository references contain a `/` once surrounding slashes are trimmed
pub fn is_canonical(token: &str) -> bool {
    token.trim_matches('/').contains('/')
}

/// Name of the first matcher accepting `token` for `id`
pub fn matching_rule(id: &str, token: &str) -> Option<&'static str> {
    MATCHERS
        .iter()
        .find(|m| (m.matches)(id, token))
        .map(|m| m.name)
}

/// First catalog entry accepted by any matcher
pub fn find_match<'a>(models: &'a [Model], token: &str) -> Option<&'a Model> {
    models.iter().find(|m| matching_rule(&m.id, token).is_some())
}

/// Resolve `token` to a canonical identifier.
///
/// `fetch` is only called when the token is not already canonical. Fetch failures propagate
/// unchanged; an empty match is [`ClientError::UnknownIdentifier`].
pub async fn resolve<F, Fut>(token: &str, fetch: F) -> Result<String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<ModelList>>,
{
    if is_canonical(token) {
        return Ok(token.to_string());
    }

    let catalog = fetch().await?;
    let Some(model) = find_match(&catalog.0, token) else {
        return Err(ClientError::UnknownIdentifier(token.to_string()));
    };

    debug!(
        "Resolved {} to {} by {} match",
        token,
        model.id,
        matching_rule(&model.id, token).unwrap_or_default()
    );
    Ok(model.id.clone())
}
