use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;

use crate::error::PipelineError;

/// Apply `f` to every item on the blocking pool, at most `max_concurrency`
/// at a time.
///
/// Results come back in input order regardless of completion order: every
/// item owns an indexed slot that its worker fills.
pub async fn parallel_map_ordered<T, R, F>(
    items: Vec<T>,
    max_concurrency: usize,
    f: F,
) -> Result<Vec<R>, PipelineError>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let total = items.len();
    let sem = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let f = Arc::new(f);
    let mut futs: FuturesUnordered<_> = FuturesUnordered::new();

    for (idx, item) in items.into_iter().enumerate() {
        let sem = sem.clone();
        let f = f.clone();

        futs.push(async move {
            let _permit = sem
                .acquire_owned()
                .await
                .map_err(|_| PipelineError::Join("semaphore closed unexpectedly".into()))?;

            let out = tokio::task::spawn_blocking(move || f(item))
                .await
                .map_err(|e| PipelineError::Join(e.to_string()))?;
            Ok::<_, PipelineError>((idx, out))
        });
    }

    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();

    while let Some(res) = futs.next().await {
        let (idx, out) = res?;
        slots[idx] = Some(out);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| {
            slot.ok_or_else(|| PipelineError::Join(format!("no result for item {idx}")))
        })
        .collect()
}
