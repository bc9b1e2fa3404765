pub type FraxelResult<T> = Result<T, FraxelError>;

#[derive(thiserror::Error, Debug)]
pub enum FraxelError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("choreography error: {0}")]
    Choreography(String),

    #[error("transition error: {0}")]
    Transition(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FraxelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn choreography(msg: impl Into<String>) -> Self {
        Self::Choreography(msg.into())
    }

    pub fn transition(msg: impl Into<String>) -> Self {
        Self::Transition(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            FraxelError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            FraxelError::geometry("x")
                .to_string()
                .contains("geometry error:")
        );
        assert!(
            FraxelError::choreography("x")
                .to_string()
                .contains("choreography error:")
        );
        assert!(
            FraxelError::transition("x")
                .to_string()
                .contains("transition error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = FraxelError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
