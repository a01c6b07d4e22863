use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_are_applied() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.compose.max_layout_depth.get(), 8);
    assert_eq!(settings.compose.stream_buffer_chunks.get(), 16);
    assert!(!settings.compose.trace_regions);
    assert!(!settings.compose.stream_responses);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn zero_layout_depth_is_rejected() {
    let mut raw = RawSettings::default();
    raw.compose.max_layout_depth = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero depth");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "compose.max_layout_depth",
            ..
        }
    ));
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "server.port",
            ..
        })
    ));
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());

    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "logging.level",
            ..
        })
    ));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["trellis"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from([
        "trellis",
        "render",
        "--compose-trace-regions",
        "true",
        "--compose-max-layout-depth",
        "3",
        "/about",
    ]);

    match args.command.expect("render command") {
        Command::Render(render) => {
            assert_eq!(render.view, "/about");
            assert_eq!(render.overrides.trace_regions, Some(true));
            assert_eq!(render.overrides.max_layout_depth, Some(3));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn render_overrides_reach_compose_settings() {
    let mut raw = RawSettings::default();
    raw.apply_compose_overrides(&ComposeOverrides {
        max_layout_depth: Some(2),
        trace_regions: Some(true),
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.compose.max_layout_depth.get(), 2);
    assert!(settings.compose.trace_regions);
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "trellis",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--compose-stream-responses",
        "yes",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(serve.overrides.stream_responses, Some(true));
        }
        _ => panic!("wrong command parsed"),
    }
}
