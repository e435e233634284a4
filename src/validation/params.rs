use crate::core::error::ValidationError;
use crate::stores::client::is_valid_key;

/// A validated add-user request
#[derive(Debug, PartialEq, Eq)]
pub struct ValidatedUser {
    pub rfid: String,
    pub name: String,
}

/// Both fields are required; the RFID doubles as a store key so it must be a
/// valid key segment
pub fn validate_new_user(rfid: &str, name: &str) -> Result<ValidatedUser, ValidationError> {
    if rfid.is_empty() || name.is_empty() {
        return Err(ValidationError::MissingFields);
    }

    validate_rfid(rfid)?;

    Ok(ValidatedUser {
        rfid: rfid.to_string(),
        name: name.to_string(),
    })
}

pub fn validate_rfid(rfid: &str) -> Result<(), ValidationError> {
    if rfid.is_empty() {
        return Err(ValidationError::MissingParameter("rfid".to_string()));
    }
    if !is_valid_key(rfid) {
        return Err(ValidationError::InvalidFormat(format!(
            "RFID '{}' may not contain '.', '$', '#', '[', ']' or '/'",
            rfid
        )));
    }
    Ok(())
}
