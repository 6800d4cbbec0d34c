use url::Url;

/// Which browser tab holds the target document.
///
/// Matches like the extension pattern `*://<host>/*`: an http or https URL
/// whose host is exactly `host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPattern {
    pub host: String,

    /// Human-readable site name used in "No <label> tab open" replies
    pub label: String,
}

impl Default for TargetPattern {
    fn default() -> Self {
        Self::new("workflowy.com", "Workflowy")
    }
}

impl TargetPattern {
    pub fn new(host: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            label: label.into(),
        }
    }

    /// Check if a tab URL belongs to the target site
    pub fn matches(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };

        matches!(parsed.scheme(), "http" | "https")
            && parsed
                .host_str()
                .is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
    }

    /// URL opened when a fresh browser is launched for the target
    pub fn start_url(&self) -> String {
        format!("https://{}/", self.host)
    }
}
