//! Sampling kernels for the triangle compositor.

pub mod bilinear;
pub mod nearest;

/// Available resampling methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResamplingMethod {
    Nearest,
    Bilinear,
}

impl ResamplingMethod {
    /// Parse from a string name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nearest" => Some(Self::Nearest),
            "bilinear" => Some(Self::Bilinear),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(
            ResamplingMethod::from_name("Nearest"),
            Some(ResamplingMethod::Nearest)
        );
        assert_eq!(
            ResamplingMethod::from_name("bilinear"),
            Some(ResamplingMethod::Bilinear)
        );
        assert_eq!(ResamplingMethod::from_name("cubic"), None);
    }
}
