//! Dotted version numbers captured by `{version}` patterns.

use std::cmp::Ordering;
use std::fmt;

/// A `major.minor[.build[.revision]]` version with optional pre-release tag.
///
/// Missing components compare as zero. A release outranks any pre-release
/// of the same number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    parts: [Component; 4],
    pre: Option<String>,
}

/// One numeric component of any width, kept as digits without leading zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Component(String);

impl Component {
    fn parse(segment: &str) -> Option<Self> {
        let digits = segment.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(digits.trim_start_matches('0').to_string()))
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("0")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl Version {
    /// Parse the numeric part (interior whitespace allowed) and a pre-release tag.
    pub fn parse(number: &str, pre: Option<&str>) -> Option<Self> {
        let mut parts: [Component; 4] = Default::default();
        let mut count = 0;
        for segment in number.split('.') {
            if count == parts.len() {
                return None;
            }
            parts[count] = Component::parse(segment)?;
            count += 1;
        }
        Some(Self {
            parts,
            pre: pre.filter(|p| !p.is_empty()).map(str::to_lowercase),
        })
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts).then_with(|| match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = &self.parts;
        write!(f, "{a}.{b}.{c}.{d}")?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        match s.split_once('-') {
            Some((n, p)) => Version::parse(n, Some(p)).unwrap(),
            None => Version::parse(s, None).unwrap(),
        }
    }

    #[test]
    fn test_numeric_compare() {
        assert!(v("1.10") > v("1.9"));
        assert!(v("1.7.1") > v("1.7"));
        assert_eq!(v("1.7.0"), v("1.7"));
        assert!(v("2.0") > v("1.99.99.99"));
    }

    #[test]
    fn test_prerelease_ranks_below_release() {
        assert!(v("2.0") > v("2.0-beta"));
        assert!(v("2.0-rc1") > v("2.0-beta"));
        assert!(v("2.0-alpha") > v("1.9"));
        assert!(v("2.0-beta").is_prerelease());
    }

    #[test]
    fn test_whitespace_and_overflow() {
        assert_eq!(v("1 . 2"), v("1.2"));
        assert!(Version::parse("1.2.3.4.5", None).is_none());
        assert!(Version::parse("1.x", None).is_none());
        assert!(Version::parse("1..2", None).is_none());
    }

    #[test]
    fn test_components_wider_than_u64() {
        let huge = v("1.99999999999999999999999");
        assert!(huge > v("1.18446744073709551615"));
        assert!(huge < v("2.0"));
        assert_eq!(v("1.007"), v("1.7"));
        assert_eq!(huge.to_string(), "1.99999999999999999999999.0.0");
        assert_eq!(v("0.0").to_string(), "0.0.0.0");
    }
}
