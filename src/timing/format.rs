use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

/// Chrome shipped the current syntax in version 65.
const LAST_LEGACY_CHROME: u32 = 64;

static CHROME_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" Chrome/(\d+)").expect("valid regex"));

/// Wire syntax used for `Server-Timing` fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderFormat {
    /// `name;desc="..";dur=..`
    #[default]
    Current,
    /// `name=..; ".."`, understood by Chrome 64 and older.
    Legacy,
}

impl HeaderFormat {
    pub fn from_user_agent(user_agent: &str) -> Self {
        let legacy = CHROME_VERSION
            .captures(user_agent)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .is_some_and(|major| major <= LAST_LEGACY_CHROME);
        if legacy {
            Self::Legacy
        } else {
            Self::Current
        }
    }

    pub fn is_legacy(self) -> bool {
        self == Self::Legacy
    }

    /// Renders one fragment. Absent fields are left out entirely.
    pub fn render(self, name: &str, description: Option<&str>, duration: Option<f64>) -> String {
        let mut out = String::from(name);
        match self {
            Self::Current => {
                if let Some(desc) = description {
                    let _ = write!(out, ";desc=\"{}\"", quote(desc));
                }
                if let Some(dur) = duration {
                    let _ = write!(out, ";dur={dur}");
                }
            }
            Self::Legacy => {
                if let Some(dur) = duration {
                    let _ = write!(out, "={dur}");
                }
                if let Some(desc) = description {
                    let _ = write!(out, "; \"{}\"", quote(desc));
                }
            }
        }
        out
    }
}

/// Escapes the body of an HTTP quoted-string.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
