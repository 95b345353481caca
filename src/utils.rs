use std::future::Future;
use tokio::sync::mpsc;

/// Run `fut` on the current runtime and deliver its output to the event loop.
pub fn run_async_to_main<T, Fut>(fut: Fut, tx: mpsc::UnboundedSender<T>)
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    tokio::spawn(async move {
        let res = fut.await;
        let _ = tx.send(res);
    });
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Split a comma separated label list, dropping blanks.
pub fn split_labels(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
