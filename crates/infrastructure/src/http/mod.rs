pub mod blocklist_fetcher;
pub mod recursor_client;

pub use blocklist_fetcher::HttpBlocklistFetcher;
pub use recursor_client::HttpRecursorClient;
