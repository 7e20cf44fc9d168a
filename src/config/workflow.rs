use std::env;

/// Which status changes the update endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any workflow status may be set at any time, including backwards moves.
    #[default]
    Permissive,
    /// Status may stay put or move forward (skipping stages is allowed).
    ForwardOnly,
}

impl TransitionPolicy {
    pub fn from_env() -> Self {
        match env::var("STATUS_TRANSITION_POLICY") {
            Ok(raw) => Self::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid STATUS_TRANSITION_POLICY '{}', falling back to permissive",
                    raw
                );
                Self::Permissive
            }),
            Err(_) => Self::Permissive,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "permissive" | "any" => Some(Self::Permissive),
            "forward-only" | "forward_only" | "forward" => Some(Self::ForwardOnly),
            _ => None,
        }
    }
}
