//! Pure transformations applied to the frozen site.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::FreezeError;

/// Marker that stops GitHub Pages from running Jekyll over the site.
pub const NOJEKYLL_FILE: &str = ".nojekyll";

/// Location of the companion script inside the site.
pub const COMPANION_SCRIPT_PATH: &str = "static/js/static-app.js";

/// Directory holding canned API responses.
pub const MOCK_API_DIR: &str = "api";

/// Directory receiving copied data files.
pub const DATA_DIR: &str = "data";

const STATIC_TEMPLATE_CALL: &str = "url_for('static'";
const STATIC_RELATIVE: &str = "./static";
const BODY_CLOSE: &str = "</body>";

/// Redirect page written when no route produced `index.html`.
pub const FALLBACK_INDEX: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Redirecting</title>
    <meta http-equiv="refresh" content="0;url=index.html">
</head>
<body>
    <p>Redirecting to the main page...</p>
    <script>window.location.href = "index.html";</script>
</body>
</html>
"#;

/// Maps a route to the file that stores its frozen response.
///
/// `/` becomes `index.html`, a trailing slash becomes `<dir>/index.html`,
/// an extensionless leaf gains `.html`, and anything else is kept. Query
/// strings and fragments are ignored.
///
/// # Errors
///
/// Returns [`FreezeError::InvalidRoute`] for routes with empty, `.` or `..`
/// segments.
pub fn route_to_file(route: &str) -> Result<Utf8PathBuf, FreezeError> {
    let path = route
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('/');
    if path.is_empty() {
        return Ok(Utf8PathBuf::from("index.html"));
    }

    let directory_route = path.ends_with('/');
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    if segments
        .iter()
        .any(|segment| segment.is_empty() || *segment == "." || *segment == "..")
    {
        return Err(FreezeError::InvalidRoute {
            route: route.to_owned(),
            reason: String::from("routes may not contain empty, '.' or '..' segments"),
        });
    }

    let mut file = Utf8PathBuf::from(segments.join("/"));
    if directory_route {
        file.push("index.html");
    } else if file.extension().is_none() {
        file.set_extension("html");
    }
    Ok(file)
}

/// Replaces leftover `url_for('static'` template calls with a relative path.
#[must_use]
pub fn rewrite_static_urls(html: &str) -> String {
    html.replace(STATIC_TEMPLATE_CALL, STATIC_RELATIVE)
}

/// Relative reference to the companion script from `page`.
#[must_use]
pub fn companion_script_src(page: &Utf8Path) -> String {
    let depth = page.components().count().saturating_sub(1);
    format!("{}{COMPANION_SCRIPT_PATH}", "../".repeat(depth))
}

/// Inserts a `<script>` tag for `src` before the last `</body>`.
///
/// Returns `None` when the page already references the companion script or
/// has no closing body tag.
#[must_use]
pub fn inject_script(html: &str, src: &str) -> Option<String> {
    if html.contains("static-app.js") {
        return None;
    }
    let index = html.rfind(BODY_CLOSE)?;
    let (head, tail) = html.split_at(index);
    Some(format!(r#"{head}<script src="{src}"></script>{tail}"#))
}

/// File name for the canned response of `endpoint`.
///
/// # Errors
///
/// Returns [`FreezeError::InvalidFixture`] when the name is empty or would
/// escape the `api/` directory.
pub fn fixture_file_name(endpoint: &str) -> Result<String, FreezeError> {
    let name = endpoint.trim().trim_start_matches('/');
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(FreezeError::InvalidFixture {
            name: endpoint.to_owned(),
            reason: String::from("endpoint names must be a single path segment"),
        });
    }
    if name.ends_with(".json") {
        Ok(name.to_owned())
    } else {
        Ok(format!("{name}.json"))
    }
}

/// Pretty prints a canned response with four-space indentation, keeping
/// non-ASCII text verbatim.
///
/// # Errors
///
/// Returns the serializer error when `value` cannot be written.
pub fn render_fixture(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/", "index.html")]
    #[case("", "index.html")]
    #[case("/success", "success.html")]
    #[case("/admin-login", "admin-login.html")]
    #[case("/blog/", "blog/index.html")]
    #[case("/feed.xml", "feed.xml")]
    #[case("/docs/guide?page=2#top", "docs/guide.html")]
    fn routes_map_to_files(#[case] route: &str, #[case] expected: &str) {
        let file = route_to_file(route).expect("route should map");
        assert_eq!(file.as_str(), expected);
    }

    #[rstest]
    #[case("/../etc/passwd")]
    #[case("/a//b")]
    #[case("/./a")]
    fn routes_escaping_the_site_are_rejected(#[case] route: &str) {
        let err = route_to_file(route).expect_err("route should be rejected");
        assert!(
            matches!(err, FreezeError::InvalidRoute { .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn static_template_calls_become_relative() {
        let html = r#"<link href="{{ url_for('static', filename='a.css') }}">"#;
        assert_eq!(
            rewrite_static_urls(html),
            r#"<link href="{{ ./static, filename='a.css') }}">"#
        );
    }

    #[rstest]
    #[case("index.html", "static/js/static-app.js")]
    #[case("blog/index.html", "../static/js/static-app.js")]
    #[case("a/b/c.html", "../../static/js/static-app.js")]
    fn script_src_is_relative_to_page_depth(#[case] page: &str, #[case] expected: &str) {
        assert_eq!(companion_script_src(Utf8Path::new(page)), expected);
    }

    #[test]
    fn script_is_injected_before_closing_body() {
        let injected = inject_script("<html><body><p>hi</p></body></html>", "static/js/static-app.js")
            .expect("script should be injected");
        assert_eq!(
            injected,
            r#"<html><body><p>hi</p><script src="static/js/static-app.js"></script></body></html>"#
        );
    }

    #[test]
    fn injection_is_idempotent() {
        let once = inject_script("<body></body>", "static/js/static-app.js")
            .expect("first injection should apply");
        assert!(inject_script(&once, "static/js/static-app.js").is_none());
    }

    #[test]
    fn pages_without_body_are_left_alone() {
        assert!(inject_script("<p>fragment</p>", "static/js/static-app.js").is_none());
    }

    #[rstest]
    #[case("check-location", "check-location.json")]
    #[case("/check-phone", "check-phone.json")]
    #[case("status.json", "status.json")]
    fn fixture_names_gain_json_extension(#[case] endpoint: &str, #[case] expected: &str) {
        assert_eq!(fixture_file_name(endpoint).expect("valid name"), expected);
    }

    #[rstest]
    #[case("")]
    #[case("..")]
    #[case("nested/name")]
    fn fixture_names_must_be_single_segments(#[case] endpoint: &str) {
        assert!(fixture_file_name(endpoint).is_err());
    }

    #[test]
    fn fixtures_use_four_space_indent_and_keep_unicode() {
        let value = serde_json::json!({ "allowed": true, "message": "Подтверждено" });
        let rendered = render_fixture(&value).expect("fixture should render");
        assert_eq!(
            rendered,
            "{\n    \"allowed\": true,\n    \"message\": \"Подтверждено\"\n}"
        );
    }
}
