use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    Res,
    spotify::{SpotifyClient, Transport},
    types::Page,
    warning,
};

/// Cursor-following sequence over a Spotify paging endpoint.
///
/// Pages are fetched lazily, one per [`next_page`](Paginator::next_page) call,
/// by following the `next` URL of the previous page. Once a page answers with
/// `next: null` no further request is made. [`restart`](Paginator::restart)
/// rewinds to the first page so the same sequence can be walked again.
///
/// Entries are decoded one by one: an entry that does not match `I` (say a
/// playlist without `owner`) is reported and left out, the rest of the page is
/// kept. Use `Option<_>` as `I` where the API sends `null` entries.
///
/// # Example
///
/// ```rust,ignore
/// let mut playlists = client.current_user_playlists();
/// while let Some(page) = playlists.next_page().await? {
///     for playlist in page.items.into_iter().flatten() {
///         println!("{}", playlist.name);
///     }
/// }
/// ```
pub struct Paginator<'a, T: Transport, I> {
    client: &'a SpotifyClient<T>,
    first: String,
    next: Option<String>,
    pages_fetched: usize,
    _item: PhantomData<fn() -> I>,
}

impl<'a, T: Transport, I: DeserializeOwned> Paginator<'a, T, I> {
    pub(crate) fn new(client: &'a SpotifyClient<T>, first: String) -> Self {
        Self {
            client,
            next: Some(first.clone()),
            first,
            pages_fetched: 0,
            _item: PhantomData,
        }
    }

    /// Fetches the next page, `Ok(None)` once the last page was consumed.
    ///
    /// The returned page holds the decodable entries only.
    ///
    /// # Errors
    ///
    /// Any request error of the underlying client. The cursor is left in place,
    /// so calling `next_page` again requests the same page.
    pub async fn next_page(&mut self) -> Res<Option<Page<I>>> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };

        let raw: Page<Value> = match self.client.get(&url).await {
            Ok(page) => page,
            Err(e) => {
                // keep the cursor so a caller may try the same page again
                self.next = Some(url);
                return Err(e);
            }
        };

        self.next = raw.next.clone();
        self.pages_fetched += 1;

        let items = raw
            .items
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<I>(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    warning!("Skipping malformed entry from {}: {}", url, e);
                    None
                }
            })
            .collect();

        Ok(Some(Page {
            items,
            next: raw.next,
            total: raw.total,
        }))
    }

    /// Collects all remaining items in page order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing page and returns its error; items of earlier
    /// pages are dropped.
    pub async fn collect_all(&mut self) -> Res<Vec<I>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page.items);
        }
        Ok(items)
    }

    /// Rewinds to the first page. The next call to
    /// [`next_page`](Self::next_page) requests the first page again.
    pub fn restart(&mut self) {
        self.next = Some(self.first.clone());
        self.pages_fetched = 0;
    }

    /// False once a page answered with `next: null`.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Pages fetched since creation or the last [`restart`](Self::restart).
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}
