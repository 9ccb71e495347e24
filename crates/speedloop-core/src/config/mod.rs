//! Configuration: the URL list (`urls.yaml`) and engine settings (`config.toml`).

mod settings;
mod urls;

pub use settings::{load_or_init, settings_path, Settings};
pub use urls::{load_urls, UrlList, DEFAULT_URLS_PATH};
