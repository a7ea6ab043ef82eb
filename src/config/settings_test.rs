// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::Settings;

#[test]
fn test_defaults_are_complete() {
    let settings: Settings = Settings::defaults()
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.worker.max_attempts, 1);
    assert!(!settings.worker.embedded);
    assert!(!settings.execution.single_flight_per_suite);
    assert_eq!(settings.stream.retry_ms, 3000);
    assert_eq!(settings.report.command, "allure");
    assert_eq!(
        settings.report.args,
        vec!["generate", "{raw}", "-o", "{dest}", "--clean"]
    );
    assert!(!settings.redis.is_in_memory());
}

#[test]
fn test_overrides_layer_on_top_of_defaults() {
    let settings: Settings = Settings::defaults()
        .unwrap()
        .set_override("redis.url", "memory://")
        .unwrap()
        .set_override("worker.poll_interval_ms", 250)
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

    assert!(settings.redis.is_in_memory());
    assert_eq!(
        settings.worker.poll_interval(),
        std::time::Duration::from_millis(250)
    );
    assert_eq!(settings.worker.lock_duration(), chrono::Duration::minutes(30));
    assert_eq!(
        settings.worker.heartbeat_interval(),
        std::time::Duration::from_secs(600)
    );
}
