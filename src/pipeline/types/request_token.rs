use std::fmt;

use serde::Serialize;

/// Generation number handed out per submitted photo. Later submissions
/// always carry larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub const INITIAL: RequestToken = RequestToken(0);

    pub fn next(self) -> RequestToken {
        RequestToken(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
