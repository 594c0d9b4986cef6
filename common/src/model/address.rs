use serde::{Deserialize, Serialize};

/// A two-line street address. Both lines are optional; an address with
/// neither line set is still a valid (empty) address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street1: Option<String>,
    pub street2: Option<String>,
}
