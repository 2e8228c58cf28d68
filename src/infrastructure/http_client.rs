use std::time::Duration;

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;

static CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build reqwest client")
});

pub async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, reqwest::Error> {
    CLIENT
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<T>()
        .await
}
