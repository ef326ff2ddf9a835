//! Resource path builders.
//!
//! Plain string composition relative to the base path. Identifiers are
//! inserted as given; callers supply values that are already valid path
//! segments.

pub fn engines() -> String {
    "engines".to_string()
}

pub fn engine(engine_id: &str) -> String {
    format!("engines/{engine_id}")
}

pub fn document_types(engine_id: &str) -> String {
    format!("{}/document_types", engine(engine_id))
}

pub fn document_type(engine_id: &str, document_type_id: &str) -> String {
    format!("{}/document_types/{document_type_id}", engine(engine_id))
}

pub fn documents(engine_id: &str, document_type_id: &str) -> String {
    format!("{}/documents", document_type(engine_id, document_type_id))
}

pub fn document(engine_id: &str, document_type_id: &str, document_id: &str) -> String {
    format!(
        "{}/documents/{document_id}",
        document_type(engine_id, document_type_id)
    )
}

pub fn search(engine_id: &str) -> String {
    format!("{}/search", engine(engine_id))
}

pub fn suggest(engine_id: &str) -> String {
    format!("{}/suggest", engine(engine_id))
}

pub fn document_type_search(engine_id: &str, document_type_id: &str) -> String {
    format!("{}/search", document_type(engine_id, document_type_id))
}

pub fn document_type_suggest(engine_id: &str, document_type_id: &str) -> String {
    format!("{}/suggest", document_type(engine_id, document_type_id))
}

/// `engines/{engine_id}/analytics/{metric}`
pub fn analytics(engine_id: &str, metric: &str) -> String {
    format!("{}/analytics/{metric}", engine(engine_id))
}

pub fn domains(engine_id: &str) -> String {
    format!("{}/domains", engine(engine_id))
}

pub fn domain(engine_id: &str, domain_id: &str) -> String {
    format!("{}/domains/{domain_id}", engine(engine_id))
}

pub fn users() -> String {
    "users".to_string()
}

pub fn user(user_id: &str) -> String {
    format!("users/{user_id}")
}
