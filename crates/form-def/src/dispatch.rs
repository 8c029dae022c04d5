use regex::Regex;
use std::sync::LazyLock;

// Unanchored on purpose: accepts "https://host/path?form=x", "?form=x"
// and "form=x&other=y" alike.
static FORM_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[?&])form=([^&#]+)").expect("form parameter pattern"));

/// Startup mode chosen from the invocation URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// No form parameter: authoring view over an empty model.
    Builder,
    /// A `form` parameter is present; the caller still has to resolve the
    /// id and surface "Form not found" when it does not.
    Fill { form_id: String },
}

/// Inspect a full URL (or a bare query string) for the `form` parameter.
pub fn dispatch(url: &str) -> Mode {
    let query = url.split_once('?').map(|(_, query)| query).unwrap_or(url);
    match FORM_PARAM.captures(query) {
        Some(captures) => Mode::Fill {
            form_id: captures[1].to_string(),
        },
        None => Mode::Builder,
    }
}

/// Canonical shareable link for a published form. `base` must reproduce
/// the invoking page's origin and path so the link is self-contained.
pub fn share_link(base: &str, form_id: &str) -> String {
    format!("{base}?form={form_id}")
}
