use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpidemicHistoryError {
    #[error("child region {child} references unknown province {province}")]
    UnknownProvince { province: String, child: String },

    #[error("duplicate province {0} in region list")]
    DuplicateProvince(String),

    #[error("ambiguous child name {name} under province {province}")]
    AmbiguousChildName { province: String, name: String },

    #[error("upstream fetch failed: {0}")]
    Fetch(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for EpidemicHistoryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Fetch(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EpidemicHistoryError>;
