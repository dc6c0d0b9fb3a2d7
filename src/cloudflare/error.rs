use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum CfError {
    MissingConfig(Vec<&'static str>),
    InvalidBaseUrl(String),
    Http(reqwest::Error),
    Timeout,
    Api {
        status: StatusCode,
        errors: Vec<ApiMessage>,
    },
    Decode(serde_json::Error),
    /// The rule could not be located, or what was located cannot be resubmitted whole.
    NotFoundOrIncomplete {
        id: String,
    },
    /// Test transport ran out of queued responses.
    #[cfg(test)]
    MockQueueEmpty,
}

impl CfError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CfError::Timeout
        } else {
            CfError::Http(err)
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CfError::Api { status, .. } => Some(*status),
            CfError::NotFoundOrIncomplete { .. } => Some(StatusCode::NOT_FOUND),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            CfError::Timeout => true,
            CfError::Http(_) => true,
            CfError::Api { status, .. } => status.is_server_error(),
            CfError::MissingConfig(_)
            | CfError::InvalidBaseUrl(_)
            | CfError::Decode(_)
            | CfError::NotFoundOrIncomplete { .. } => false,
            #[cfg(test)]
            CfError::MockQueueEmpty => false,
        }
    }
}

impl std::fmt::Display for CfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CfError::MissingConfig(names) => {
                write!(f, "missing required environment variables: {}", names.join(", "))
            }
            CfError::InvalidBaseUrl(url) => write!(f, "invalid CF_BASE_URL: {url}"),
            CfError::Http(err) => write!(f, "http error: {err}"),
            CfError::Timeout => write!(f, "request timed out"),
            CfError::Api { status, errors } => {
                if errors.is_empty() {
                    write!(f, "api error {status}: unknown error")
                } else {
                    let joined: Vec<String> = errors.iter().map(ApiMessage::to_string).collect();
                    write!(f, "api error {status}: {}", joined.join("; "))
                }
            }
            CfError::Decode(err) => write!(f, "decode error: {err}"),
            CfError::NotFoundOrIncomplete { id } => {
                write!(f, "rule {id} not found or incomplete")
            }
            #[cfg(test)]
            CfError::MockQueueEmpty => write!(f, "mock transport response queue is empty"),
        }
    }
}

impl std::error::Error for CfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CfError::Http(err) => Some(err),
            CfError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

/// One entry of the `errors` array in a failed upstream response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

impl std::fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
}
