/// Candidate endpoint tables, one ordered list per logical operation.
///
/// The backend grew out of two route registrations (`/documents/` and
/// `/uploads/`) that never converged, so reads and writes each carry the
/// known variants in priority order. Fixed-route operations (profile
/// generation, job matching, chat) have exactly one entry.
#[derive(Debug, Clone)]
pub struct RouteTable {
    base: String,
}

impl RouteTable {
    /// `base` is the API root, e.g. `http://127.0.0.1:8000/api`. Trailing
    /// slashes are stripped so candidates join cleanly.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn list_documents(&self, doc_type: Option<&str>) -> Vec<String> {
        match doc_type {
            Some(t) => vec![
                format!("{}/documents/?doc_type={t}", self.base),
                format!("{}/uploads/?doc_type={t}", self.base),
            ],
            None => vec![format!("{}/documents/", self.base)],
        }
    }

    /// Project lists probe `/uploads/` first — the opposite order from typed
    /// document lists.
    pub fn list_projects(&self) -> Vec<String> {
        vec![
            format!("{}/uploads/?doc_type=PROJECT", self.base),
            format!("{}/documents/?doc_type=PROJECT", self.base),
        ]
    }

    pub fn create(&self) -> Vec<String> {
        vec![
            format!("{}/uploads/", self.base),
            format!("{}/documents/", self.base),
        ]
    }

    pub fn update(&self, id: i64) -> Vec<String> {
        vec![
            format!("{}/documents/{id}/", self.base),
            format!("{}/uploads/{id}/", self.base),
        ]
    }

    pub fn delete(&self, id: i64) -> Vec<String> {
        vec![
            format!("{}/documents/{id}/", self.base),
            format!("{}/uploads/{id}/", self.base),
        ]
    }

    pub fn generate_profile(&self) -> String {
        format!("{}/profile/generate/", self.base)
    }

    pub fn match_jobs(&self) -> String {
        format!("{}/jobs/match/", self.base)
    }

    pub fn chat(&self) -> String {
        format!("{}/agent/chat/", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_stripped() {
        let routes = RouteTable::new("http://localhost:8000/api/");
        assert_eq!(routes.base(), "http://localhost:8000/api");
        assert_eq!(
            routes.generate_profile(),
            "http://localhost:8000/api/profile/generate/"
        );
    }

    #[test]
    fn test_typed_list_prefers_documents() {
        let routes = RouteTable::new("http://x/api");
        assert_eq!(
            routes.list_documents(Some("CERTIFICATE")),
            vec![
                "http://x/api/documents/?doc_type=CERTIFICATE",
                "http://x/api/uploads/?doc_type=CERTIFICATE",
            ]
        );
    }

    #[test]
    fn test_untyped_list_has_single_candidate() {
        let routes = RouteTable::new("http://x/api");
        assert_eq!(routes.list_documents(None), vec!["http://x/api/documents/"]);
    }

    #[test]
    fn test_project_list_prefers_uploads() {
        let routes = RouteTable::new("http://x/api");
        assert_eq!(
            routes.list_projects(),
            vec![
                "http://x/api/uploads/?doc_type=PROJECT",
                "http://x/api/documents/?doc_type=PROJECT",
            ]
        );
    }

    #[test]
    fn test_item_routes_carry_the_id() {
        let routes = RouteTable::new("http://x/api");
        assert_eq!(
            routes.update(42),
            vec!["http://x/api/documents/42/", "http://x/api/uploads/42/"]
        );
        assert_eq!(routes.delete(42), routes.update(42));
    }
}
