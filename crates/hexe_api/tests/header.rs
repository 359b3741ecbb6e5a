use hexe_api::headers::{
    build_headers, default_user_agent, ACCEPT_EVENT_STREAM, ACCEPT_JSON, HEADER_ACCEPT,
    HEADER_CACHE_CONTROL, HEADER_COOKIE, HEADER_USER_AGENT,
};
use hexe_api::HexeApiConfig;

#[test]
fn header_map_contains_stream_headers() {
    let config = HexeApiConfig::new("https://hexe.example")
        .with_session_token("token-42")
        .insert_header("X-Extra", " value ");

    let headers = build_headers(&config, ACCEPT_EVENT_STREAM);
    assert_eq!(
        headers.get(HEADER_ACCEPT).expect("accept"),
        &"text/event-stream".to_owned()
    );
    assert_eq!(
        headers.get(HEADER_CACHE_CONTROL).expect("cache-control"),
        &"no-cache".to_owned()
    );
    assert_eq!(
        headers.get(HEADER_COOKIE).expect("cookie"),
        &"session=token-42".to_owned()
    );
    assert_eq!(headers.get("x-extra").expect("custom"), &"value".to_owned());
}

#[test]
fn header_map_omits_cookie_without_session() {
    let config = HexeApiConfig::new("https://hexe.example").with_session_token("   ");
    let headers = build_headers(&config, ACCEPT_JSON);

    assert!(headers.get(HEADER_COOKIE).is_none());
    assert!(headers.get(HEADER_CACHE_CONTROL).is_none());
}

#[test]
fn header_map_uses_configured_user_agent() {
    let config = HexeApiConfig::new("https://hexe.example").with_user_agent(" configured ");
    let headers = build_headers(&config, ACCEPT_JSON);
    assert_eq!(
        headers.get(HEADER_USER_AGENT).expect("user-agent"),
        &"configured".to_string()
    );

    let config = HexeApiConfig::new("https://hexe.example").with_user_agent("   ");
    let headers = build_headers(&config, ACCEPT_JSON);
    assert_eq!(
        headers.get(HEADER_USER_AGENT).expect("user-agent"),
        &default_user_agent()
    );
}

#[test]
fn header_map_defaults_user_agent() {
    let config = HexeApiConfig::default();
    let headers = build_headers(&config, ACCEPT_JSON);
    assert_eq!(
        headers.get(HEADER_USER_AGENT).expect("user-agent"),
        &default_user_agent()
    );
    assert!(default_user_agent().starts_with("hexe_api/"));
}
