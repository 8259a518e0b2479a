//! Logging setup shared by the Antenna binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the workspace library crates and the binary itself.
/// `RUST_LOG` overrides it entirely when set.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "antenna-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use antenna_shared::logger::setup_logger;
///
/// setup_logger("antenna-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the filter directive used when `RUST_LOG` is not set.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let mut targets = vec![
        "antenna_shared".to_string(),
        "antenna_server".to_string(),
        "antenna_client".to_string(),
    ];
    let binary_target = binary_name.replace('-', "_");
    if !targets.contains(&binary_target) {
        targets.push(binary_target);
    }
    targets
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .chain(std::iter::once("tower_http=info".to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_workspace_crates() {
        // テスト項目: デフォルトのフィルタがワークスペースの各クレートを含む
        // given (前提条件):
        let binary_name = "antenna-server";

        // when (操作):
        let filter = default_filter(binary_name, "debug");

        // then (期待する結果):
        assert!(filter.contains("antenna_server=debug"));
        assert!(filter.contains("antenna_shared=debug"));
        assert!(filter.contains("tower_http=info"));
        assert_eq!(filter.matches("antenna_server=").count(), 1);
    }

    #[test]
    fn test_default_filter_normalizes_binary_name() {
        // テスト項目: バイナリ名のハイフンがアンダースコアに変換される
        // given (前提条件):
        let binary_name = "my-tool";

        // when (操作):
        let filter = default_filter(binary_name, "warn");

        // then (期待する結果):
        assert!(filter.contains("my_tool=warn"));
        assert!(!filter.contains("my-tool"));
    }
}
