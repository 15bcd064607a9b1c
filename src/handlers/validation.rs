use serde_json::{Map, Value};

use crate::error::ApiError;

/// Required fields for `POST /users`, in the order errors are reported
pub const USER_FIELDS: [&str; 4] = ["firstName", "lastName", "emailAddress", "password"];

/// Required fields for `POST /courses` and `PUT /courses/:id`
pub const COURSE_FIELDS: [&str; 2] = ["title", "description"];

pub fn missing_value(field: &str) -> String {
    format!("Please provide a value for \"{}\"", field)
}

/// Interpret a raw request body as a JSON object.
///
/// An empty body is an empty object, so every required field is reported
/// missing rather than failing on the body as a whole.
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::validation(vec![
            "Request body must be a JSON object".to_string(),
        ])),
        Err(e) => {
            tracing::debug!("Rejected malformed JSON body: {}", e);
            Err(ApiError::validation(vec!["Request body must be valid JSON".to_string()]))
        }
    }
}

/// Extract every required field as a non-blank string.
///
/// All fields are checked before returning, so the error lists each
/// violation once, in `fields` order. Accepted values are returned as sent.
pub fn required_strings<const N: usize>(
    body: &Map<String, Value>,
    fields: [&str; N],
) -> Result<[String; N], ApiError> {
    let mut errors = Vec::new();
    let mut values = Vec::with_capacity(N);

    for field in fields {
        match body.get(field).and_then(Value::as_str) {
            Some(value) if !value.trim().is_empty() => values.push(value.to_string()),
            _ => errors.push(missing_value(field)),
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let mut values = values.into_iter();
    Ok(std::array::from_fn(|_| values.next().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn errors_of(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(errors) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn returns_values_in_field_order() {
        let body = object(json!({ "description": "Intro", "title": "Algorithms" }));
        let [title, description] = required_strings(&body, COURSE_FIELDS).unwrap();
        assert_eq!(title, "Algorithms");
        assert_eq!(description, "Intro");
    }

    #[test]
    fn collects_every_violation() {
        let body = object(json!({ "firstName": "Joe", "lastName": "   ", "emailAddress": 42 }));
        let errors = errors_of(required_strings(&body, USER_FIELDS).unwrap_err());
        assert_eq!(
            errors,
            vec![
                "Please provide a value for \"lastName\"",
                "Please provide a value for \"emailAddress\"",
                "Please provide a value for \"password\"",
            ]
        );
    }

    #[test]
    fn missing_password_message() {
        let body = object(json!({
            "firstName": "Joe",
            "lastName": "Smith",
            "emailAddress": "joe@smith.com"
        }));
        let errors = errors_of(required_strings(&body, USER_FIELDS).unwrap_err());
        assert_eq!(errors, vec!["Please provide a value for \"password\""]);
    }

    #[test]
    fn values_are_not_trimmed() {
        let body = object(json!({ "title": " Padded ", "description": "d" }));
        let [title, _] = required_strings(&body, COURSE_FIELDS).unwrap();
        assert_eq!(title, " Padded ");
    }

    #[test]
    fn empty_body_is_empty_object() {
        assert!(parse_object(b"").unwrap().is_empty());
        assert!(parse_object(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_object_and_malformed_bodies() {
        assert_eq!(
            errors_of(parse_object(b"[1,2]").unwrap_err()),
            vec!["Request body must be a JSON object"]
        );
        assert_eq!(
            errors_of(parse_object(b"{\"title\":").unwrap_err()),
            vec!["Request body must be valid JSON"]
        );
    }
}
