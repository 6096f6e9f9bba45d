//! Hardware variant selection for GPU-specific package builds.
//!
//! Pure functions only: probing the machine is the job of the
//! `PlatformProbe` port, these helpers interpret what it returns.

/// Label the GPU driver utility prints before the toolkit version.
pub const DRIVER_VERSION_LABEL: &str = "CUDA Version";

/// Environment variables inspected when the driver utility is unavailable.
pub const VERSION_ENV_VARS: &[&str] = &["CUDA_VERSION", "CUDA_HOME", "CUDA_ROOT"];

/// Name of the GPU driver query utility.
pub const GPU_DRIVER_UTILITY: &str = "nvidia-smi";

/// Known toolkit versions (major.minor prefix) and their variant tags.
const VARIANT_TABLE: &[(&str, &str)] = &[
    ("12.1", "cu121"),
    ("12.0", "cu120"),
    ("11.8", "cu118"),
    ("11.7", "cu117"),
    ("11.6", "cu116"),
];

/// Markers that mean a package spec already names a hardware variant.
const EXPLICIT_VARIANT_MARKERS: &[&str] = &["+cu", "+cpu"];

/// Package families that go through variant resolution.
pub const KNOWN_FAMILIES: &[&str] = &["torch", "pytorch"];

/// Base URL of the per-variant wheel indexes.
pub const VARIANT_INDEX_BASE: &str = "https://download.pytorch.org/whl";

/// Index used when the package spec carries an explicit variant tag.
pub const DEFAULT_VARIANT_TAG: &str = "cu121";

/// Tag of the generic, CPU-only index.
pub const CPU_TAG: &str = "cpu";

/// Map a toolkit version to a variant tag.
///
/// Matching is an exact major.minor prefix test against a fixed table;
/// anything unknown (or no version at all) yields `None`.
#[must_use]
pub fn map_version_to_variant(version: Option<&str>) -> Option<&'static str> {
    let version = version?.trim();
    if version.is_empty() {
        return None;
    }
    VARIANT_TABLE
        .iter()
        .find(|(prefix, _)| version.starts_with(prefix))
        .map(|(_, tag)| *tag)
}

/// Extract the toolkit version from GPU driver utility output.
///
/// Looks for [`DRIVER_VERSION_LABEL`] and returns the first token after it,
/// e.g. `"12.1"` from `"... CUDA Version: 12.1     |"`.
#[must_use]
pub fn parse_driver_output(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (_, rest) = line.split_once(DRIVER_VERSION_LABEL)?;
        let rest = rest.trim().trim_start_matches(':').trim();
        rest.split_whitespace()
            .next()
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

/// Extract a major.minor version from an environment variable value.
///
/// Accepts values such as `"11.8"`, `"12.1.105"` or a path ending in a
/// version (`"/usr/local/cuda-12.1"`). Returns `None` when no dotted
/// number with a numeric major part is present.
#[must_use]
pub fn version_from_env_value(value: &str) -> Option<String> {
    let value = value.trim();
    if !value.contains('.') {
        return None;
    }
    let tail = value
        .rsplit(['/', '\\', '-'])
        .find(|segment| segment.contains('.'))?;
    let mut parts = tail.split('.');
    let major = parts.next()?;
    if major.is_empty() || !major.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match parts.next() {
        Some(minor) if !minor.is_empty() => Some(format!("{major}.{minor}")),
        _ => Some(major.to_string()),
    }
}

/// Whether the package spec already carries an explicit hardware variant tag.
#[must_use]
pub fn has_explicit_variant(spec: &str) -> bool {
    EXPLICIT_VARIANT_MARKERS
        .iter()
        .any(|marker| spec.contains(marker))
}

/// Whether the first whitespace-delimited token names a known family.
#[must_use]
pub fn is_known_family(spec: &str) -> bool {
    let Some(first) = spec.split_whitespace().next() else {
        return false;
    };
    let lower = first.to_ascii_lowercase();
    KNOWN_FAMILIES
        .iter()
        .any(|family| lower.starts_with(family))
}

/// Index location for a variant tag (`None` selects the CPU index).
#[must_use]
pub fn index_url_for(tag: Option<&str>) -> String {
    format!("{VARIANT_INDEX_BASE}/{}/", tag.unwrap_or(CPU_TAG))
}
