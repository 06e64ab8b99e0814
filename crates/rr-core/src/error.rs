use thiserror::Error;

pub type RrResult<T> = Result<T, RrError>;

#[derive(Error, Debug)]
pub enum RrError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, RrError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(RrError::NonFinite { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_finite_passes_through() {
        assert_eq!(ensure_finite(2.5, "test").unwrap(), 2.5);
    }
}
