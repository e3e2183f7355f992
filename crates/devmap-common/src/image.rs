//! Container image reference parsing
//!
//! Splits `[registry/]repository[:tag][@digest]` into its parts. A colon only
//! starts a tag when it appears after the last `/`, so `registry:5000/app` has
//! no tag.

use crate::DEFAULT_IMAGE_TAG;

/// A parsed container image reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageReference<'a> {
    /// Everything before the tag/digest (registry and repository path)
    pub repository: &'a str,
    /// Explicit tag, if any
    pub tag: Option<&'a str>,
    /// Content digest (e.g. `sha256:...`), if any
    pub digest: Option<&'a str>,
}

impl<'a> ImageReference<'a> {
    /// Parse an image reference. Never fails; malformed input simply has no tag.
    pub fn parse(reference: &'a str) -> Self {
        let (name, digest) = match reference.split_once('@') {
            Some((name, digest)) => (name, Some(digest)),
            None => (reference, None),
        };

        let last_slash = name.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (repository, tag) = match name[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                (&name[..split], Some(&name[split + 1..]).filter(|t| !t.is_empty()))
            }
            None => (name, None),
        };

        Self {
            repository,
            tag,
            digest,
        }
    }

    /// Tag to publish under: the explicit tag, or `latest` when untagged or
    /// pinned only by digest.
    pub fn tag_or_default(&self) -> &'a str {
        self.tag.unwrap_or(DEFAULT_IMAGE_TAG)
    }

    /// Pull policy for this image: mutable references are always pulled.
    pub fn pull_policy(&self) -> &'static str {
        if self.digest.is_none() && matches!(self.tag, None | Some(DEFAULT_IMAGE_TAG)) {
            "Always"
        } else {
            "IfNotPresent"
        }
    }
}
