use super::normalize;

/// Flat list of "unavailable" phrases, matched as substrings.
///
/// Markers are stored lowercased with their whitespace removed, because the
/// windows they are compared against have already been normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoldOutClassifier {
    markers: Vec<String>,
}

impl SoldOutClassifier {
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Self {
        let mut out: Vec<String> = Vec::with_capacity(markers.len());
        for m in markers {
            let m = normalize(m.as_ref()).to_lowercase();
            // an empty marker would match every window
            if !m.is_empty() && !out.contains(&m) {
                out.push(m);
            }
        }
        Self { markers: out }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// True when any marker occurs anywhere in `window`, ignoring case.
    pub fn is_unavailable(&self, window: &str) -> bool {
        if window.is_empty() || self.markers.is_empty() {
            return false;
        }
        let window = window.to_lowercase();
        self.markers.iter().any(|m| window.contains(m.as_str()))
    }
}
