use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::model::lecture::Lecture;

const CACHE_CAPACITY: u64 = 50_000;

/// Lecture schedules keyed by lecture id.
///
/// A lecture's start time does not change once the lecture exists, so the TTL
/// only bounds how long a deleted lecture can still be seen.
#[derive(Clone)]
pub struct LectureCache {
    inner: Cache<String, Lecture>,
}

impl LectureCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, lecture_id: &str) -> Option<Lecture> {
        self.inner.get(lecture_id).await
    }

    pub async fn insert(&self, lecture: Lecture) {
        self.inner.insert(lecture.id.clone(), lecture).await;
    }

    async fn insert_batch(&self, lectures: Vec<Lecture>) {
        let futures: Vec<_> = lectures
            .into_iter()
            .map(|l| self.inner.insert(l.id.clone(), l))
            .collect();

        futures_util::future::join_all(futures).await;
    }

    /// Load lectures starting within the next `days` days (batched)
    pub async fn warmup(&self, pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
        let mut stream = sqlx::query_as::<_, Lecture>(
            r#"
            SELECT id, module_id, title, starts_at, ends_at
            FROM lectures
            WHERE starts_at >= UTC_TIMESTAMP() - INTERVAL 1 DAY
            AND starts_at < UTC_TIMESTAMP() + INTERVAL ? DAY
            ORDER BY starts_at
            "#,
        )
        .bind(days)
        .fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(row) = stream.next().await {
            batch.push(row?);
            total += 1;

            if batch.len() >= batch_size {
                self.insert_batch(std::mem::take(&mut batch)).await;
            }
        }

        if !batch.is_empty() {
            self.insert_batch(batch).await;
        }

        tracing::info!(total, days, "Lecture cache warmup complete");
        Ok(())
    }
}
