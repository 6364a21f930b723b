//! Folio - Main Entry Point
//!
//! Resolves settings, wires the file storage into the configuration
//! service, loads both documents and prints the request tree.

use std::sync::Arc;

use folio_application::{ConfigService, PreferencesManager, RequestsManager};
use folio_domain::RequestsConfig;
use folio_infrastructure::{
    AppConfig, FileStorage, PREFERENCES_FILE_MODE, REQUESTS_FILE_MODE, SystemClock,
    TracingEventSink,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let paths = config.paths();
    tracing::info!(
        data_dir = %paths.data_dir().display(),
        "Starting Folio v{}",
        env!("CARGO_PKG_VERSION")
    );

    let clock = Arc::new(SystemClock::new());
    let requests = RequestsManager::new(
        FileStorage::new(REQUESTS_FILE_MODE),
        paths.requests_file(),
        clock.clone(),
    )
    .with_debounce(config.save_debounce);
    let preferences = PreferencesManager::new(
        FileStorage::new(PREFERENCES_FILE_MODE),
        paths.preferences_file(),
        clock,
    )
    .with_debounce(config.save_debounce);

    let service = ConfigService::new(requests, preferences);
    service.connect(Arc::new(TracingEventSink::new()));
    service.load_all().await?;

    let tree = service.get_requests().await;
    let prefs = service.get_preferences().await;
    println!(
        "{} ({} requests, theme {:?}, font size {})",
        paths.requests_file().display(),
        tree.request_count(),
        prefs.theme,
        prefs.font_size
    );
    for line in outline(&tree) {
        println!("{line}");
    }

    Ok(())
}

/// Renders the tree as indented lines, roots in display order.
fn outline(config: &RequestsConfig) -> Vec<String> {
    let mut lines = Vec::new();
    for root in config.ordered_roots() {
        push_item(config, root, 0, &mut lines);
    }
    lines
}

fn push_item(config: &RequestsConfig, id: &str, depth: usize, lines: &mut Vec<String>) {
    let Some(item) = config.get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    if item.is_folder() {
        lines.push(format!("{indent}{}/", item.name));
        for child in &item.children {
            push_item(config, child, depth + 1, lines);
        }
    } else {
        lines.push(format!(
            "{indent}{} {} {}",
            item.method().unwrap_or_default(),
            item.path().unwrap_or_default(),
            item.name
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::Item;

    #[test]
    fn test_outline_follows_root_order_and_nesting() {
        let config = RequestsConfig::new()
            .with_item("a", Item::folder("Users").with_children(["r1", "n"]))
            .with_item("n", Item::folder("Admin").with_children(["r2"]))
            .with_item("r1", Item::request("List", "GET", "/users"))
            .with_item("r2", Item::request("Purge", "DELETE", "/users"))
            .with_item("b", Item::folder("Auth"))
            .with_root_order(["b", "a"]);

        assert_eq!(
            outline(&config),
            vec![
                "Auth/",
                "Users/",
                "  GET /users List",
                "  Admin/",
                "    DELETE /users Purge",
            ]
        );
    }
}
