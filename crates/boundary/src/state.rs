use backdrop::RenderError;

/// Where the guarded renderer currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderState {
    #[default]
    Loading,
    Ready,
    Failed(RenderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The renderer mounted successfully.
    Mounted,
    /// Mounting or rendering returned an error or panicked.
    Threw(RenderError),
    /// The user asked for a fresh attempt.
    Retry,
}

impl Transition {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mounted => "mounted",
            Self::Threw(_) => "threw",
            Self::Retry => "retry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transition '{transition}' is not valid from state '{from}'")]
pub struct TransitionError {
    pub from: &'static str,
    pub transition: &'static str,
}

impl RenderState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&RenderError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// `Loading → Ready` on mount, `Loading | Ready → Failed` on a thrown
    /// error, `Failed → Loading` on retry. Anything else is rejected.
    pub fn apply(&self, transition: Transition) -> Result<RenderState, TransitionError> {
        match (self, transition) {
            (Self::Loading, Transition::Mounted) => Ok(Self::Ready),
            (Self::Loading | Self::Ready, Transition::Threw(error)) => Ok(Self::Failed(error)),
            (Self::Failed(_), Transition::Retry) => Ok(Self::Loading),
            (from, transition) => Err(TransitionError {
                from: from.label(),
                transition: transition.label(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boom() -> RenderError {
        RenderError::Init("boom".into())
    }

    #[test]
    fn legal_transitions() {
        let ready = RenderState::Loading.apply(Transition::Mounted).unwrap();
        assert_eq!(ready, RenderState::Ready);

        let failed = ready.apply(Transition::Threw(boom())).unwrap();
        assert_eq!(failed.error(), Some(&boom()));

        let failed_early = RenderState::Loading.apply(Transition::Threw(boom())).unwrap();
        assert!(failed_early.is_failed());

        assert_eq!(failed.apply(Transition::Retry).unwrap(), RenderState::Loading);
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let err = RenderState::Ready.apply(Transition::Mounted).unwrap_err();
        assert_eq!(err.from, "ready");
        assert_eq!(err.transition, "mounted");

        assert!(RenderState::Loading.apply(Transition::Retry).is_err());
        assert!(RenderState::Ready.apply(Transition::Retry).is_err());
        assert!(RenderState::Failed(boom())
            .apply(Transition::Mounted)
            .is_err());
        assert!(RenderState::Failed(boom())
            .apply(Transition::Threw(boom()))
            .is_err());
    }
}
