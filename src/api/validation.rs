use crate::api::errors::ApiError;

pub(crate) const MAX_USERNAME_LEN: usize = 150;

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

pub(crate) fn validate_username(username: &str) -> Result<(), ApiError> {
    let len = username.chars().count();
    if len == 0 || len > MAX_USERNAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "Username must be 1 to {MAX_USERNAME_LEN} characters"
        )));
    }

    if username.chars().all(is_username_char) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "Username may contain only letters, digits and @/./+/-/_".to_string(),
        ))
    }
}
