use crate::datastore::Store;
use crate::metrics;
use crate::veil::Fallible;
use serde::Deserialize;
use std::future::Future;
use std::time::Instant;

pub mod admin;
pub mod posts;

/// Shared handler state, generic over the store so tests can swap in the
/// mock implementation.
#[derive(Clone)]
pub struct State<S: Store> {
    pub ds: S,
}

/// The `?page=` query parameter, 1-based.
#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn number(self) -> u32 {
        self.page.unwrap_or(1)
    }
}

/// Execute the closure, then log its operational metrics, e.g. time taken, whether it returned Ok/Err, etc.
async fn observe<F, Fut, R>(name: &'static str, f: F) -> Fallible<R>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Fallible<R>>,
{
    let start = Instant::now();
    let return_val = f().await;
    let duration = start.elapsed();
    metrics::HANDLER_SECS
        .with_label_values(&[name])
        .observe(duration.as_secs_f64());
    metrics::RESPONSES
        .with_label_values(&[name, variant_name(&return_val)])
        .inc();
    return_val
}

fn variant_name<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "err"
    }
}
