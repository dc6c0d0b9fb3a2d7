use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::envelope;
use super::error::CfError;
use super::transport::Transport;

#[derive(Clone, Debug)]
pub struct FetchOpts {
    pub per_page: u32,
    /// Extra query parameters, sent ahead of `page`/`per_page`.
    pub params: Vec<(String, String)>,
}

impl FetchOpts {
    pub fn per_page(per_page: u32) -> Self {
        Self { per_page, params: Vec::new() }
    }
}

impl Default for FetchOpts {
    fn default() -> Self {
        Self::per_page(super::config::DEFAULT_PER_PAGE)
    }
}

/// A fully walked collection: items in upstream order plus the first page's metadata.
///
/// Serializes as the upstream listing shape, `{success, result, result_info}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Collection {
    pub success: bool,
    #[serde(rename = "result")]
    pub items: Vec<Value>,
    pub result_info: Option<Value>,
}

/// Walk a page-numbered listing to completion.
///
/// Pages are requested strictly in sequence. The known page count only ever
/// grows, and a page without metadata ends the walk. Any transport error
/// aborts the walk and drops what was gathered so far.
pub async fn fetch_all<T>(transport: &T, path: &str, opts: &FetchOpts) -> Result<Collection, CfError>
where
    T: Transport + ?Sized,
{
    let mut items = Vec::new();
    let mut first_info: Option<Value> = None;
    let mut page: u32 = 1;
    let mut known_pages: u32 = 1;

    loop {
        let mut query = opts.params.clone();
        query.push(("page".to_string(), page.to_string()));
        query.push(("per_page".to_string(), opts.per_page.to_string()));

        let body = transport.get(path, &query).await?;

        let page_items = envelope::page_items(&body);
        let fetched = page_items.map_or(0, Vec::len);
        if let Some(page_items) = page_items {
            items.extend(page_items.iter().cloned());
        }

        let Some(info) = envelope::page_info(&body) else {
            debug!(path, page, fetched, "page without result_info; stopping");
            break;
        };
        if first_info.is_none() {
            first_info = Some(info.clone());
        }
        if let Some(reported) = envelope::total_pages(info) {
            known_pages = known_pages.max(reported);
        }
        debug!(path, page, fetched, total_pages = known_pages, "page fetched");

        if page >= known_pages {
            break;
        }
        page += 1;
    }

    Ok(Collection { success: true, items, result_info: first_info })
}
