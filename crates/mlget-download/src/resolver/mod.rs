//! Package spec resolution.
//!
//! [`SpecResolver`] turns what the user typed into ordered fetch candidates.
//! Rules are checked in order and the first match wins:
//!
//! 1. a URL with an allow-listed scheme is passed through unchanged
//! 2. an existing filesystem path is canonicalized
//! 3. a name ending in an archive suffix is passed through as-is
//! 4. a known GPU-variant family goes through variant resolution
//!
//! Anything else is unresolvable.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use mlget_core::domain::variant::{
    DEFAULT_VARIANT_TAG, VERSION_ENV_VARS, has_explicit_variant, index_url_for, is_known_family,
    map_version_to_variant, parse_driver_output, version_from_env_value,
};
use mlget_core::domain::{file_uri, has_archive_suffix, is_url};
use mlget_core::{Candidate, IndexDownloader, PlatformProbe, ResolveError, SourceResolver};

/// Default [`SourceResolver`] implementation.
pub struct SpecResolver {
    probe: Arc<dyn PlatformProbe>,
    index: Arc<dyn IndexDownloader>,
}

impl SpecResolver {
    pub fn new(probe: Arc<dyn PlatformProbe>, index: Arc<dyn IndexDownloader>) -> Self {
        Self { probe, index }
    }

    /// Index location to download a known-family spec from.
    ///
    /// An explicit variant tag in the package spec skips GPU probing entirely.
    pub fn select_index(&self, spec: &str) -> String {
        if has_explicit_variant(spec) {
            debug!(spec, "Spec names its variant, using default variant index");
            return index_url_for(Some(DEFAULT_VARIANT_TAG));
        }

        let version = detect_toolkit_version(self.probe.as_ref());
        let tag = map_version_to_variant(version.as_deref());
        info!(
            version = version.as_deref().unwrap_or("none"),
            variant = tag.unwrap_or("cpu"),
            "Selected package variant"
        );
        index_url_for(tag)
    }

    async fn resolve_variant(&self, spec: &str) -> Result<Vec<Candidate>, ResolveError> {
        let index_url = self.select_index(spec);
        let files = self.index.download(spec, &index_url).await?;
        if files.is_empty() {
            return Err(ResolveError::NoCandidates {
                spec: spec.to_string(),
            });
        }
        Ok(files
            .iter()
            .map(|path| Candidate::Url(file_uri(path)))
            .collect())
    }
}

#[async_trait]
impl SourceResolver for SpecResolver {
    async fn resolve(&self, spec: &str) -> Result<Vec<Candidate>, ResolveError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(ResolveError::Unresolvable {
                spec: spec.to_string(),
            });
        }

        if is_url(spec) {
            return Ok(vec![Candidate::Url(spec.to_string())]);
        }

        let path = Path::new(spec);
        if path.exists() {
            let canonical = path
                .canonicalize()
                .map_err(|e| ResolveError::Io(format!("{spec}: {e}")))?;
            return Ok(vec![Candidate::LocalPath(canonical)]);
        }

        if has_archive_suffix(spec) {
            return Ok(vec![Candidate::Passthrough(spec.to_string())]);
        }

        if is_known_family(spec) {
            return self.resolve_variant(spec).await;
        }

        Err(ResolveError::Unresolvable {
            spec: spec.to_string(),
        })
    }
}

/// Detect the GPU toolkit version.
///
/// The driver utility wins when it is on the path and its output carries a
/// version; otherwise the environment variables are checked in order.
/// Probing never fails, it only comes back empty.
pub fn detect_toolkit_version(probe: &dyn PlatformProbe) -> Option<String> {
    if let Some(version) = probe
        .query_gpu_driver_output()
        .as_deref()
        .and_then(parse_driver_output)
    {
        debug!(%version, "Toolkit version from driver utility");
        return Some(version);
    }

    VERSION_ENV_VARS.iter().find_map(|name| {
        let value = probe.read_env(name)?;
        let version = version_from_env_value(&value)?;
        debug!(var = name, %version, "Toolkit version from environment");
        Some(version)
    })
}
