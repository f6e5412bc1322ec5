pub type NightrailResult<T> = Result<T, NightrailError>;

#[derive(thiserror::Error, Debug)]
pub enum NightrailError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("scene error: {0}")]
    Scene(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NightrailError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            NightrailError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(NightrailError::scene("x").to_string().contains("scene error:"));
        assert!(
            NightrailError::render("x")
                .to_string()
                .contains("render error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = NightrailError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
