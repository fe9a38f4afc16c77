mod helpers;

use helpers::flag_value;
use rscurl::RscurlError;
use rscurl::command::{build_download_args, build_request_args, render_command_line};
use rscurl::request::{DownloadArgs, HttpMethod, RequestSpec};

#[test]
fn post_body_with_single_quote_is_passed_literally() {
    let body = r#"{"name": "O'Brien"}'; touch /tmp/pwned; echo '"#;
    let spec = RequestSpec::new("https://api.example.com/users")
        .unwrap()
        .with_method(HttpMethod::Post)
        .with_body(body);

    let args = build_request_args(&spec).unwrap();

    assert_eq!(flag_value(&args, "--data-raw"), Some(body));
    // The body is one argv element; nothing after it was split off.
    assert_eq!(args.iter().filter(|a| a.contains("touch")).count(), 1);
    assert_eq!(args.last().map(String::as_str), Some("https://api.example.com/users"));
}

#[test]
fn rendered_command_line_uses_close_escape_reopen_quoting() {
    let spec = RequestSpec::new("https://api.example.com/")
        .unwrap()
        .with_method(HttpMethod::Post)
        .with_body("it's");
    let args = build_request_args(&spec).unwrap();

    let line = render_command_line("curl", &args);
    assert!(line.contains(r"--data-raw 'it'\''s'"), "unexpected rendering: {}", line);
}

#[test]
fn get_with_data_has_no_body_argument() {
    let spec = RequestSpec::new("https://example.com/search")
        .unwrap()
        .with_body("q=ignored");

    let args = build_request_args(&spec).unwrap();

    assert!(!args.iter().any(|a| a == "--data-raw" || a == "--data" || a == "-d"));
    assert!(!args.iter().any(|a| a == "q=ignored"));
}

#[test]
fn body_bearing_methods_attach_body() {
    for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch] {
        let spec = RequestSpec::new("https://example.com").unwrap().with_method(method).with_body("x");
        let args = build_request_args(&spec).unwrap();
        assert_eq!(flag_value(&args, "--data-raw"), Some("x"), "method {}", method);
        assert_eq!(flag_value(&args, "--request"), Some(method.to_string().as_str()));
    }
}

#[test]
fn delete_drops_body() {
    let spec = RequestSpec::new("https://example.com/item/1")
        .unwrap()
        .with_method(HttpMethod::Delete)
        .with_body("ignored");
    let args = build_request_args(&spec).unwrap();
    assert!(flag_value(&args, "--data-raw").is_none());
    assert_eq!(flag_value(&args, "--request"), Some("DELETE"));
}

#[test]
fn body_starting_with_at_sign_is_not_a_file_reference() {
    let spec = RequestSpec::new("https://example.com")
        .unwrap()
        .with_method(HttpMethod::Post)
        .with_body("@/etc/passwd");
    let args = build_request_args(&spec).unwrap();
    assert!(args.iter().any(|a| a == "--data-raw"));
    assert!(!args.iter().any(|a| a == "--data" || a == "--data-binary"));
}

#[test]
fn headers_keep_order_and_format() {
    let spec = RequestSpec::new("https://example.com")
        .unwrap()
        .with_header("X-Second", "2")
        .with_header("Accept", "application/json");
    let args = build_request_args(&spec).unwrap();

    let headers: Vec<_> = args
        .iter()
        .enumerate()
        .filter(|(_, a)| *a == "--header")
        .map(|(i, _)| args[i + 1].as_str())
        .collect();
    assert_eq!(headers, ["X-Second: 2", "Accept: application/json"]);
}

#[test]
fn header_with_line_break_is_rejected() {
    let spec = RequestSpec::new("https://example.com")
        .unwrap()
        .with_header("X-Evil", "a\r\nX-Injected: 1");
    let err = build_request_args(&spec).unwrap_err();
    assert!(matches!(err, RscurlError::Validation(_)));
}

#[test]
fn redirect_and_include_flags() {
    let mut spec = RequestSpec::new("https://example.com").unwrap();
    let args = build_request_args(&spec).unwrap();
    assert!(args.iter().any(|a| a == "--location"));
    assert!(!args.iter().any(|a| a == "--include"));

    spec.follow_redirects = false;
    spec.include_headers = true;
    let args = build_request_args(&spec).unwrap();
    assert!(!args.iter().any(|a| a == "--location"));
    assert!(args.iter().any(|a| a == "--include"));
}

#[test]
fn timeout_and_user_agent_are_passed() {
    let mut spec = RequestSpec::new("https://example.com").unwrap();
    spec.timeout_seconds = 12;
    spec.user_agent = "agent 'quoted'".to_string();
    let args = build_request_args(&spec).unwrap();
    assert_eq!(flag_value(&args, "--max-time"), Some("12"));
    assert_eq!(flag_value(&args, "--user-agent"), Some("agent 'quoted'"));
    assert!(args.starts_with(&["--silent".to_string(), "--show-error".to_string()]));
}

#[test]
fn download_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let output = camino::Utf8PathBuf::from_path_buf(dir.path().join("file.bin")).unwrap();
    let spec = DownloadArgs {
        url: "https://example.com/file.bin".to_string(),
        output_path: output.clone(),
        timeout_seconds: Some(60),
        follow_redirects: Some(false),
    }
    .into_spec()
    .unwrap();

    let args = build_download_args(&spec);
    assert!(args.iter().any(|a| a == "--fail"));
    assert!(!args.iter().any(|a| a == "--location"));
    assert_eq!(flag_value(&args, "--output"), Some(output.as_str()));
    assert_eq!(flag_value(&args, "--max-time"), Some("60"));
    assert_eq!(flag_value(&args, "--url"), Some("https://example.com/file.bin"));
}
