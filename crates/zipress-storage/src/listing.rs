//! Paged listing helpers.

use crate::traits::{Storage, StorageResult};

/// Request successive pages until the listing is exhausted.
pub async fn list_all_keys(storage: &dyn Storage, page_size: usize) -> StorageResult<Vec<String>> {
    let mut keys = Vec::new();
    let mut start_after: Option<String> = None;

    loop {
        let page = storage
            .list_keys(start_after.as_deref(), page_size)
            .await?;
        tracing::debug!(
            bucket = %storage.bucket(),
            page_len = page.keys.len(),
            "Listed key page"
        );
        keys.extend(page.keys);

        match page.next_start_after {
            Some(next) => start_after = Some(next),
            None => break,
        }
    }

    Ok(keys)
}
