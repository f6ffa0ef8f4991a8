use regex::Regex;
use std::sync::OnceLock;

/// Registry path of the runtime images eggs are deployed on.
pub const RUNTIME_IMAGE_PREFIX: &str = "ghcr.io/pterodactyl/yolks:java_";

/// Container image for a managed runtime (Java) version.
pub fn runtime_image(managed_runtime_version: u8) -> String {
    format!("{}{}", RUNTIME_IMAGE_PREFIX, managed_runtime_version)
}

/// Java version encoded in an image reference that follows the `java_<N>` tag
/// convention, e.g. `ghcr.io/pterodactyl/yolks:java_17` -> `17`.
pub fn runtime_label_from_image(image: &str) -> Option<u8> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[/:]java_(\d+)$").expect("valid regex"));
    re.captures(image.trim())
        .and_then(|caps| caps[1].parse().ok())
}
