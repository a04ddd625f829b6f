use serde::{Deserialize, Serialize};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Chat text can carry the visitor's phone number and email; only show shapes.
        let form_summary: Vec<String> = self
            .form
            .iter()
            .map(|(k, v)| format!("{k}(len={})", v.len()))
            .collect();

        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("form", &form_summary)
            .finish()
    }
}

impl HttpRequest {
    pub fn post_form(url: String, form: Vec<(String, String)>) -> Self {
        Self {
            method: "POST".into(),
            url,
            headers: vec![("Content-Type".into(), FORM_CONTENT_TYPE.into())],
            form,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = HttpRequest::post_form("/chat".into(), vec![]);
        assert_eq!(req.header("content-type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn debug_hides_form_values() {
        let req = HttpRequest::post_form(
            "/chat".into(),
            vec![
                ("session_id".into(), "abc".into()),
                ("text".into(), "phone: 4165550134, email: jane@example.com".into()),
            ],
        );

        let s = format!("{req:?}");
        assert!(!s.contains("4165550134"));
        assert!(!s.contains("jane@example.com"));
        assert!(s.contains("text(len="));
    }
}
