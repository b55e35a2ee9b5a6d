use serde::Serialize;
use wildlog_location::LocationSnapshot;

/// Which of the three screen variants a renderer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenState {
    /// Waiting on the first permission check or fix
    Loading,
    /// Permission missing; offer to open settings
    Unauthorized,
    Ready,
}

impl ScreenState {
    #[must_use]
    pub fn from_snapshot(snapshot: &LocationSnapshot) -> Self {
        if snapshot.loading {
            Self::Loading
        } else if snapshot.is_granted() {
            Self::Ready
        } else {
            Self::Unauthorized
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Unauthorized => "unauthorized",
            Self::Ready => "ready",
        }
    }
}

impl std::fmt::Display for ScreenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
