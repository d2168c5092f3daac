pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://npiregistry.cms.hhs.gov/provider-view";

/// Well-known export names, tried in order when no explicit input path is given.
pub const DEFAULT_INPUT_CANDIDATES: &[&str] = &[
    "enrichment_clean.csv",
    "profile_enrichment_export.csv",
    "profile_enrichment_base44.csv",
    "enrichment_v5_clean.csv",
    "viewer_data.csv",
];

/// Case-insensitive stand-ins for "no value" (compared after trimming).
pub const SENTINEL_TOKENS: &[&str] = &["", "na", "n/a", "nan", "none"];

pub const SOURCE_KEY: &str = "source";
pub const SUPPRESSED_KEYS: &[&str] = &["confidence"];

pub const UNKNOWN_NAME: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";
