pub mod catalog;
pub mod order;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Chat-platform user identity. Sessions, orders, and the privileged-user
/// set are all keyed by this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
