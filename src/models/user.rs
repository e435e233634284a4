use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Store path holding the RFID → name mapping
pub const USERS_PATH: &str = "users";

/// An authorized card holder
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// RFID tag, unique key of the mapping
    pub rfid: String,
    /// Display name
    pub name: String,
}

impl User {
    pub fn new(rfid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            rfid: rfid.into(),
            name: name.into(),
        }
    }
}

/// Store path of a single user record
pub fn user_path(rfid: &str) -> String {
    format!("{}/{}", USERS_PATH, rfid)
}

/// Project a `users` snapshot into the RFID → name mapping.
/// Entries whose value is not a string are skipped.
pub fn project_users(snapshot: Option<&Value>) -> BTreeMap<String, String> {
    let Some(Value::Object(map)) = snapshot else {
        return BTreeMap::new();
    };

    map.iter()
        .filter_map(|(rfid, name)| name.as_str().map(|name| (rfid.clone(), name.to_string())))
        .collect()
}

/// Project a `users` snapshot into a list ordered by RFID
pub fn project_user_list(snapshot: Option<&Value>) -> Vec<User> {
    project_users(snapshot)
        .into_iter()
        .map(|(rfid, name)| User { rfid, name })
        .collect()
}
