//! Browser bindings: `localStorage` session backend and a timer future

use std::time::Duration;

use market_core::{MarketError, Result, SessionStorage};
use wasm_bindgen::JsValue;

/// `window.localStorage`, looked up on every call
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| MarketError::Storage("no window".into()))?
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| MarketError::Storage("localStorage unavailable".into()))
    }
}

impl SessionStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        Self::storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        Self::storage()?.remove_item(key).map_err(js_error)
    }
}

fn js_error(value: JsValue) -> MarketError {
    MarketError::Storage(format!("{value:?}"))
}

/// Resolve after `duration` using `setTimeout`
pub async fn sleep(duration: Duration) {
    let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().is_some_and(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
                .is_ok()
        });
        if !scheduled {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

/// Query string of the current page, including the leading `?`
pub fn location_search() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

/// Send the browser to an external URL
pub fn redirect_to(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().set_href(url) {
            tracing::error!(error = ?e, "Failed to redirect");
        }
    }
}

/// `{origin}/api`
pub fn api_base_url() -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:5173".into());
    format!("{origin}/api")
}
