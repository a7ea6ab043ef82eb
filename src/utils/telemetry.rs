// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,apitestrs=debug";

/// 初始化日志
///
/// `RUST_LOG` 覆盖默认过滤规则，`APITESTRS_LOG_FORMAT=json` 输出 JSON 行
pub fn init_telemetry() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    // try_init: tests and embedded workers may initialise twice
    let result = if json_requested(std::env::var("APITESTRS_LOG_FORMAT").ok().as_deref()) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if let Err(e) = result {
        eprintln!("Tracing subscriber already installed: {}", e);
    }
}

fn json_requested(format: Option<&str>) -> bool {
    format
        .map(|f| f.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
