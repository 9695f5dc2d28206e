//! User-facing messages for transport-level HTTP status codes.

/// Map a transport status to the message shown in the failure notification
pub fn check_status(code: u16) -> &'static str {
    match code {
        400 => "Request failed, please try again later",
        401 => "Login has expired, please sign in again",
        403 => "You are not allowed to access this resource",
        404 => "The requested resource does not exist",
        405 => "Request method not allowed",
        408 => "Request timed out, please try again later",
        500 => "Server error, please try again later",
        502 => "Gateway error, please try again later",
        503 => "Service unavailable, please try again later",
        504 => "Gateway timed out, please try again later",
        _ => "Request failed, please try again later",
    }
}

#[cfg(test)]
mod tests {
    use super::check_status;

    #[test]
    fn known_codes_have_specific_messages() {
        assert!(check_status(401).contains("expired"));
        assert!(check_status(403).contains("not allowed"));
        assert!(check_status(404).contains("does not exist"));
    }

    #[test]
    fn unknown_codes_fall_back_to_generic() {
        assert_eq!(check_status(418), check_status(499));
    }
}
