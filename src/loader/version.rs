use serde::Serialize;
use std::fmt;

/// Managed runtime used when a game version cannot be parsed.
const FALLBACK_MANAGED_RUNTIME: u8 = 21;

/// Dotted game version such as `1.20.1`. Only the numeric prefix of each
/// component is read, so `1.20.1-pre2` parses as `1.20.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GameVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GameVersion {
    pub fn parse(version: &str) -> Option<Self> {
        let mut parts = version.trim().split('.');
        let major = leading_number(parts.next()?)?;
        let minor = leading_number(parts.next()?)?;
        let patch = parts.next().and_then(leading_number).unwrap_or(0);
        Some(Self {
            major,
            minor,
            patch,
        })
    }

    /// Release line, e.g. `1.20` for `1.20.4`.
    pub fn release_line(&self) -> (u32, u32) {
        (self.major, self.minor)
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn leading_number(part: &str) -> Option<u32> {
    let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Java version required by a game version.
///
/// Monotonic in the game version: `<=1.16` needs 8, `1.17`/`1.17.1` need 16,
/// up to `1.20.x` and `1.21` need 17, everything newer needs 21.
pub fn managed_runtime_version(target_runtime_version: &str) -> u8 {
    let Some(version) = GameVersion::parse(target_runtime_version) else {
        return FALLBACK_MANAGED_RUNTIME;
    };

    match (version.minor, version.patch) {
        (minor, _) if minor <= 16 => 8,
        (17, patch) if patch <= 1 => 16,
        (minor, _) if minor <= 20 => 17,
        (21, 0) => 17,
        _ => 21,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[test]
    fn test_parse() {
        assert_eq!(
            GameVersion::parse("1.20.1"),
            Some(GameVersion {
                major: 1,
                minor: 20,
                patch: 1
            })
        );
        assert_eq!(GameVersion::parse("1.12").map(|v| v.patch), Some(0));
        assert_eq!(GameVersion::parse("1.20.1-pre2").map(|v| v.patch), Some(1));
        assert_eq!(GameVersion::parse("latest"), None);
        assert_eq!(GameVersion::parse("1"), None);
        assert_eq!(GameVersion::parse(""), None);
    }

    #[test]
    fn test_display_and_release_line() {
        let v = GameVersion::parse("1.21").unwrap();
        assert_eq!(v.to_string(), "1.21.0");
        assert_eq!(v.release_line(), (1, 21));
    }

    #[parameterized(
        beta_era = { "1.7.10", 8 },
        legacy = { "1.12.2", 8 },
        last_java8 = { "1.16.5", 8 },
        caves_cliffs = { "1.17", 16 },
        caves_cliffs_patch = { "1.17.1", 16 },
        late_117 = { "1.17.2", 17 },
        wild = { "1.19.2", 17 },
        trails = { "1.20.1", 17 },
        late_120 = { "1.20.6", 17 },
        tricky_trials = { "1.21", 17 },
        tricky_trials_patch = { "1.21.1", 21 },
        newer = { "1.22.0", 21 },
        unparseable = { "snapshot", 21 },
    )]
    fn test_managed_runtime_version(version: &str, expected: u8) {
        assert_eq!(managed_runtime_version(version), expected);
    }

    #[test]
    fn test_managed_runtime_is_monotonic() {
        let versions = [
            "1.8.9", "1.12.2", "1.16.5", "1.17", "1.17.1", "1.18.2", "1.19.4", "1.20.1",
            "1.21", "1.21.1", "1.21.4",
        ];
        let runtimes: Vec<u8> = versions.iter().map(|v| managed_runtime_version(v)).collect();
        assert!(runtimes.windows(2).all(|w| w[0] <= w[1]));
    }
}
