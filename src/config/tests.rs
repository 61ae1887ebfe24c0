use super::settings::Settings;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8086);
    assert_eq!(settings.heartbeat.outgoing_ms, 0);
    assert_eq!(settings.heartbeat.incoming_ms, 0);
}
