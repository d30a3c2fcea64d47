use chrono::NaiveDate;

use super::*;

fn test_client(base_url: &str) -> XClient {
    XClient::with_base_url("test-token", 30, base_url).expect("client construction should not fail")
}

fn param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[test]
fn build_search_url_targets_recent_search() {
    let client = test_client("https://api.x.com/2");
    let url = client.build_search_url(&SearchRequest::new("TVK", 50), None, 50);
    assert_eq!(url.path(), "/2/tweets/search/recent");
    assert_eq!(param(&url, "query").as_deref(), Some("TVK"));
    assert_eq!(param(&url, "max_results").as_deref(), Some("50"));
    assert_eq!(param(&url, "expansions").as_deref(), Some("author_id"));
    assert_eq!(param(&url, "tweet.fields").as_deref(), Some(TWEET_FIELDS));
    assert_eq!(param(&url, "user.fields").as_deref(), Some(USER_FIELDS));
    assert!(param(&url, "start_time").is_none());
    assert!(param(&url, "next_token").is_none());
}

#[test]
fn build_search_url_strips_trailing_slash() {
    let with = test_client("https://api.x.com/2/");
    let without = test_client("https://api.x.com/2");
    let req = SearchRequest::new("TVK", 10);
    assert_eq!(
        with.build_search_url(&req, None, 10),
        without.build_search_url(&req, None, 10)
    );
}

#[test]
fn build_search_url_clamps_page_size() {
    let client = test_client("https://api.x.com/2");
    let req = SearchRequest::new("TVK", 500);
    let small = client.build_search_url(&req, None, 3);
    let large = client.build_search_url(&req, None, 500);
    assert_eq!(param(&small, "max_results").as_deref(), Some("10"));
    assert_eq!(param(&large, "max_results").as_deref(), Some("100"));
}

#[test]
fn build_search_url_includes_start_time_and_token() {
    let client = test_client("https://api.x.com/2");
    let req = SearchRequest::new("TVK", 100)
        .with_since(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    let url = client.build_search_url(&req, Some("abc123"), 100);
    assert_eq!(
        param(&url, "start_time").as_deref(),
        Some("2024-05-01T00:00:00Z")
    );
    assert_eq!(param(&url, "next_token").as_deref(), Some("abc123"));
}

#[test]
fn build_search_url_encodes_special_characters() {
    let client = test_client("https://api.x.com/2");
    let url = client.build_search_url(&SearchRequest::new("#TVK OR @vijay", 10), None, 10);
    assert!(
        url.as_str().contains("%23TVK"),
        "query param should be percent-encoded: {url}"
    );
    assert_eq!(param(&url, "query").as_deref(), Some("#TVK OR @vijay"));
}

#[test]
fn invalid_base_url_is_a_config_error() {
    let result = XClient::with_base_url("t", 30, "not a url");
    assert!(matches!(result, Err(FetchError::InvalidConfig(_))));
}
