//! CLI command handlers. Each command is in its own file.

mod add;
mod completions;
mod delete;
mod download;
mod integrity;
mod list;
mod verify;

pub use add::run_add;
pub use completions::run_completions;
pub use delete::run_delete;
pub use download::run_download;
pub use integrity::run_integrity;
pub use list::run_list;
pub use verify::run_verify;

use grabit_core::config::GrabitConfig;
use grabit_core::fetch::FetchContext;

/// Context for one command's network activity: configured deadline, cancelled on Ctrl-C.
pub(crate) fn fetch_context(cfg: &GrabitConfig) -> FetchContext {
    let ctx = match cfg.timeout() {
        Some(t) => FetchContext::new().with_timeout(t),
        None => FetchContext::new(),
    };
    let handle = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling transfer");
            handle.cancel();
        }
    });
    ctx
}
