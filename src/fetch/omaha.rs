//! Omaha update-check request building and response parsing.

use serde::Deserialize;
use url::Url;

use super::{FetchError, FetchResult};

#[derive(Debug, Deserialize)]
struct GUpdate {
    #[serde(rename = "app", default)]
    apps: Vec<App>,
}

#[derive(Debug, Deserialize)]
struct App {
    #[serde(rename = "@appid", default)]
    appid: String,
    updatecheck: Option<UpdateCheck>,
}

#[derive(Debug, Deserialize)]
struct UpdateCheck {
    #[serde(rename = "@codebase")]
    codebase: Option<String>,
    #[serde(rename = "@status", default)]
    status: String,
}

/// Build the update-check URL for one component.
///
/// Omaha expects the component query packed into a single `x` parameter,
/// itself URL-encoded: `x=id%3D<id>%26v%3D<version>%26uc`.
pub(crate) fn update_check_url(
    endpoint: &str,
    component_id: &str,
    version: &str,
) -> FetchResult<Url> {
    let mut url = Url::parse(endpoint)?;
    let component_query = format!("id={component_id}&v={version}&uc");
    url.query_pairs_mut().append_pair("x", &component_query);
    Ok(url)
}

/// Pull the container download URL for `component_id` out of an
/// update-check response document.
pub(crate) fn crx_url_from_response(xml: &str, component_id: &str) -> FetchResult<String> {
    let gupdate: GUpdate = quick_xml::de::from_str(xml)?;

    let app = gupdate
        .apps
        .iter()
        .find(|app| app.appid.eq_ignore_ascii_case(component_id))
        .ok_or_else(|| {
            FetchError::UpdateCheck(format!("no entry for component {component_id}"))
        })?;

    let check = app.updatecheck.as_ref().ok_or_else(|| {
        FetchError::UpdateCheck("response carries no updatecheck element".to_string())
    })?;

    match check.codebase.as_deref() {
        Some(codebase) if !codebase.is_empty() => Ok(codebase.to_string()),
        _ => Err(FetchError::UpdateCheck(format!(
            "updatecheck status {:?} without a codebase URL",
            check.status
        ))),
    }
}
