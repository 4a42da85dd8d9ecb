use thiserror::Error;

/// Failures of the reconstruction oracle, classified for the retry policy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OracleError {
    /// Provider throttled the request (HTTP 429, quota exhausted).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Provider-side failure (HTTP 5xx).
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Provider answered with no text.
    #[error("empty response")]
    EmptyResponse,

    /// Anything that retrying will not fix (auth, bad request, unknown model).
    #[error("oracle call failed: {0}")]
    Permanent(String),

    /// Transient failures persisted past the retry bound.
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<OracleError>,
    },
}

impl OracleError {
    /// Returns `true` for error classes worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::RateLimited(_) | OracleError::Server { .. })
    }

    /// Classifies a provider error message.
    ///
    /// Providers surface HTTP failures as text, so the status code or a
    /// well-known phrase is looked up in the message. Only numbers labelled
    /// as a status (or leading the message) count as status codes.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        match status_code(&lower) {
            Some(429) => return OracleError::RateLimited(message.to_string()),
            Some(status) if status >= 500 => {
                return OracleError::Server {
                    status,
                    message: message.to_string(),
                };
            }
            Some(_) => return OracleError::Permanent(message.to_string()),
            None => {}
        }

        if lower.contains("rate limit")
            || lower.contains("resource exhausted")
            || lower.contains("resource_exhausted")
            || lower.contains("too many requests")
            || lower.contains("quota")
        {
            OracleError::RateLimited(message.to_string())
        } else if lower.contains("overloaded")
            || lower.contains("unavailable")
            || lower.contains("internal server error")
            || lower.contains("bad gateway")
            || lower.contains("gateway timeout")
        {
            OracleError::Server {
                status: 503,
                message: message.to_string(),
            }
        } else {
            OracleError::Permanent(message.to_string())
        }
    }
}

/// Words that label the number after them as an HTTP status.
const STATUS_LABELS: [&str; 5] = ["http", "status", "code", "error", "statuscode"];

/// First three-digit number in the HTTP status range that leads `message`
/// or directly follows a status label.
fn status_code(message: &str) -> Option<u16> {
    let tokens: Vec<&str> = message
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();

    tokens.iter().enumerate().find_map(|(i, token)| {
        if token.len() != 3 {
            return None;
        }
        let code = token.parse::<u16>().ok().filter(|code| (100..600).contains(code))?;
        let labelled = i == 0 || STATUS_LABELS.contains(&tokens[i - 1]);
        labelled.then_some(code)
    })
}
