//! API handlers for the asset management REST endpoints

pub mod assets;
pub mod assignments;
pub mod health;
pub mod openapi;
pub mod response;
pub mod return_requests;
pub mod users;

use axum::http::Uri;

/// Path and query of the current request with the paging parameters removed,
/// so page links keep every other filter the client sent
pub fn paging_route(uri: &Uri) -> String {
    let path = uri.path();
    let kept: Vec<&str> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            !key.eq_ignore_ascii_case("pageIndex") && !key.eq_ignore_ascii_case("pageSize")
        })
        .collect();

    if kept.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, kept.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_paging_parameters() {
        let uri: Uri = "/api/v1/assignments?location=HaNoi&pageIndex=2&search=lap&pageSize=10"
            .parse()
            .unwrap();
        assert_eq!(paging_route(&uri), "/api/v1/assignments?location=HaNoi&search=lap");
    }

    #[test]
    fn bare_path_stays_bare() {
        let uri: Uri = "/api/v1/users?pageIndex=3".parse().unwrap();
        assert_eq!(paging_route(&uri), "/api/v1/users");
    }
}
