use std::path::PathBuf;
use crate::errors::FairwayError;

/// Where a submitted recording comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoSource {
    Local(PathBuf),
    Remote(String),
}

impl VideoSource {
    pub fn parse(uri: &str) -> Result<Self, FairwayError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(FairwayError::Validation("video_uri is required".to_string()));
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return Ok(Self::Remote(uri.to_string()));
        }
        if let Some(path) = uri.strip_prefix("file://") {
            if path.is_empty() {
                return Err(FairwayError::Validation(format!("Invalid file URI '{}'", uri)));
            }
            return Ok(Self::Local(PathBuf::from(path)));
        }
        if let Some((scheme, _)) = uri.split_once("://") {
            return Err(FairwayError::Validation(format!("Unsupported URI scheme '{}'", scheme)));
        }
        Ok(Self::Local(PathBuf::from(uri)))
    }

    /// Name used for the extension check.
    pub fn name(&self) -> String {
        match self {
            Self::Local(p) => p.to_string_lossy().into_owned(),
            Self::Remote(u) => u.clone(),
        }
    }

    /// Location of the pose sidecar that may accompany the video.
    pub fn sidecar(&self) -> VideoSource {
        match self {
            Self::Local(p) => {
                let mut s = p.clone().into_os_string();
                s.push(super::SIDECAR_SUFFIX);
                Self::Local(PathBuf::from(s))
            }
            Self::Remote(u) => {
                let (base, query) = match u.split_once('?') {
                    Some((b, q)) => (b, Some(q)),
                    None => (u.as_str(), None),
                };
                match query {
                    Some(q) => Self::Remote(format!("{}{}?{}", base, super::SIDECAR_SUFFIX, q)),
                    None => Self::Remote(format!("{}{}", base, super::SIDECAR_SUFFIX)),
                }
            }
        }
    }
}
