use minserve::error::RouteError;
use minserve::router::{
    Method, PathPattern, RouteTable, Segment, extract_params_and_query, parse_query,
};

fn noop(
    _req: &minserve::Request,
    _res: &mut minserve::Response<'_>,
) -> anyhow::Result<()> {
    Ok(())
}

#[test]
fn test_method_parse_is_case_insensitive() {
    assert_eq!(Method::parse("GET").unwrap(), Method::Get);
    assert_eq!(Method::parse("post").unwrap(), Method::Post);
    assert_eq!(Method::parse("Patch").unwrap(), Method::Patch);
    assert_eq!("delete".parse::<Method>().unwrap(), Method::Delete);
    assert_eq!(Method::Put.to_string(), "PUT");
}

#[test]
fn test_unsupported_methods_rejected() {
    for method in ["TRACE", "HEAD", "OPTIONS", "CONNECT", ""] {
        assert!(matches!(
            Method::parse(method),
            Err(RouteError::UnsupportedMethod(_))
        ));
    }
}

#[test]
fn test_add_path_rejects_unsupported_method() {
    let mut routes = RouteTable::new();
    let result = routes.add_path("trace", "/", noop);

    assert!(matches!(result, Err(RouteError::UnsupportedMethod(m)) if m == "trace"));
    assert!(routes.is_empty());
}

#[test]
fn test_template_segments() {
    let pattern = PathPattern::compile("/users/:id/*").unwrap();

    assert_eq!(
        pattern.segments(),
        &[
            Segment::Literal(String::new()),
            Segment::Literal("users".to_string()),
            Segment::Param(":id".to_string()),
            Segment::Wildcard,
        ]
    );
    assert_eq!(pattern.param_positions(), &[2]);
}

#[test]
fn test_resolve_binds_params_by_position() {
    let mut routes = RouteTable::new();
    routes.add_path("get", "/users/:user/posts/:post", noop).unwrap();

    for (user, post) in [("1", "2"), ("alice", "hello-world"), ("x", "")] {
        let path = format!("/users/{user}/posts/{post}");
        let endpoint = routes.resolve("GET", &path).unwrap();
        let (params, query) = endpoint.extract_params_and_query(&path).unwrap();

        assert_eq!(params.len(), 2);
        assert_eq!(params[":user"], user);
        assert_eq!(params[":post"], post);
        assert!(query.is_empty());
    }
}

#[test]
fn test_resolve_first_registered_wins() {
    let mut routes = RouteTable::new();
    routes.add_path("get", "/items/:id", noop).unwrap();
    routes.add_path("get", "/items/special", noop).unwrap();

    let endpoint = routes.resolve("get", "/items/special").unwrap();

    assert_eq!(endpoint.pattern().template(), "/items/:id");
}

#[test]
fn test_resolve_requires_matching_method() {
    let mut routes = RouteTable::new();
    routes.add_path("post", "/items", noop).unwrap();
    routes.add_path("get", "/items", noop).unwrap();

    let endpoint = routes.resolve("GET", "/items").unwrap();

    assert_eq!(endpoint.method(), Method::Get);
}

#[test]
fn test_resolve_unsupported_method_never_matches() {
    let mut routes = RouteTable::new();
    routes.add_path("get", "/", noop).unwrap();

    assert!(matches!(
        routes.resolve("TRACE", "/"),
        Err(RouteError::UnsupportedMethod(_))
    ));
}

#[test]
fn test_resolve_not_found() {
    let mut routes = RouteTable::new();
    routes.add_path("get", "/users", noop).unwrap();

    assert!(matches!(
        routes.resolve("GET", "/orders"),
        Err(RouteError::NotFound { .. })
    ));
    assert!(matches!(
        routes.resolve("DELETE", "/users"),
        Err(RouteError::NotFound { .. })
    ));
}

#[test]
fn test_matching_is_substring_not_full_path() {
    let mut routes = RouteTable::new();
    routes.add_path("get", "/users", noop).unwrap();

    assert!(routes.resolve("GET", "/api/users/7").is_ok());
    assert!(routes.resolve("GET", "/users-archive").is_ok());
}

#[test]
fn test_anchored_template_matches_exact_path() {
    let mut routes = RouteTable::new();
    routes.add_path("get", "^/users$", noop).unwrap();

    assert!(routes.resolve("GET", "/users").is_ok());
    assert!(matches!(
        routes.resolve("GET", "/api/users"),
        Err(RouteError::NotFound { .. })
    ));
    assert!(matches!(
        routes.resolve("GET", "/users/7"),
        Err(RouteError::NotFound { .. })
    ));
}

#[test]
fn test_anchored_template_with_param() {
    let mut routes = RouteTable::new();
    routes.add_path("get", "^/users/:id$", noop).unwrap();

    let endpoint = routes.resolve("GET", "/users/7").unwrap();
    let (params, _) = endpoint.extract_params_and_query("/users/7").unwrap();

    assert_eq!(params[":id"], "7");
    assert!(routes.resolve("GET", "/users/7/posts").is_err());
}

#[test]
fn test_add_path_rejects_invalid_pattern() {
    let mut routes = RouteTable::new();
    let result = routes.add_path("get", "/files/[", noop);

    assert!(matches!(result, Err(RouteError::InvalidTemplate { .. })));
    assert!(routes.is_empty());
}

#[test]
fn test_root_template_matches_everything() {
    let mut routes = RouteTable::new();
    routes.add_path("get", "/", noop).unwrap();
    routes.add_path("get", "/hello/:name", noop).unwrap();

    let endpoint = routes.resolve("GET", "/hello/bob").unwrap();

    assert_eq!(endpoint.pattern().template(), "/");
}

#[test]
fn test_wildcard_matches_but_is_not_captured() {
    let mut routes = RouteTable::new();
    routes.add_path("get", "/files/*/:name", noop).unwrap();

    let endpoint = routes.resolve("GET", "/files/2024/report").unwrap();
    let (params, _) = endpoint.extract_params_and_query("/files/2024/report").unwrap();

    assert_eq!(params.len(), 1);
    assert_eq!(params[":name"], "report");
}

#[test]
fn test_query_parsing() {
    let mut routes = RouteTable::new();
    routes.add_path("get", "/x", noop).unwrap();

    let endpoint = routes.resolve("GET", "/x?a=1&b=2").unwrap();
    let (params, query) = endpoint.extract_params_and_query("/x?a=1&b=2").unwrap();

    assert!(params.is_empty());
    assert_eq!(query.len(), 2);
    assert_eq!(query["a"], "1");
    assert_eq!(query["b"], "2");
}

#[test]
fn test_query_value_truncated_at_second_equals() {
    let query = parse_query("a=1=2");

    assert_eq!(query.len(), 1);
    assert_eq!(query["a"], "1");
}

#[test]
fn test_query_pair_without_equals_dropped() {
    let query = parse_query("flag&a=1&&b=");

    assert_eq!(query.len(), 2);
    assert_eq!(query["a"], "1");
    assert_eq!(query["b"], "");
    assert!(!query.contains_key("flag"));
}

#[test]
fn test_extract_with_explicit_positions() {
    let pattern = PathPattern::compile("/orgs/:org/teams/:team").unwrap();

    let (params, query) = extract_params_and_query(
        "/orgs/acme/teams/core?expand=members",
        pattern.param_positions(),
        pattern.segments(),
    )
    .unwrap();

    assert_eq!(params[":org"], "acme");
    assert_eq!(params[":team"], "core");
    assert_eq!(query["expand"], "members");
}

#[test]
fn test_extract_with_too_few_segments_is_an_error() {
    let pattern = PathPattern::compile("/a/b/:c").unwrap();

    let result = extract_params_and_query("/a", pattern.param_positions(), pattern.segments());

    assert!(matches!(
        result,
        Err(RouteError::ParamOutOfRange { index: 3, segments: 2, .. })
    ));
}
