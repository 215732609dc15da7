// ── Device name/IP matcher ──
//
// Shell-style globs: `*` is any run of characters, `?` exactly one.
// Everything else is literal, matching is case-sensitive and anchored
// to the whole field.

use regex::Regex;

use crate::error::CoreError;

/// Compiled device-match patterns, built once from the command line.
#[derive(Debug, Clone)]
pub struct DevicePatterns {
    patterns: Vec<Regex>,
}

impl DevicePatterns {
    pub fn new<I, S>(patterns: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let glob = p.as_ref();
                Regex::new(&glob_to_regex(glob)).map_err(|e| CoreError::Config {
                    message: format!("invalid device pattern '{glob}': {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// `true` if the system IP or the hostname fully matches any pattern.
    pub fn matches(&self, system_ip: &str, host_name: &str) -> bool {
        self.patterns
            .iter()
            .any(|re| re.is_match(system_ip) || re.is_match(host_name))
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut re = String::with_capacity(glob.len() + 8);
    re.push_str("^(?:");
    let mut buf = [0u8; 4];
    for ch in glob.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            _ => re.push_str(&regex::escape(ch.encode_utf8(&mut buf))),
        }
    }
    re.push_str(")$");
    re
}
