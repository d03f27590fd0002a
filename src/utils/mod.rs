pub mod text;

use std::{sync::OnceLock, time::Duration};

use reqwest::{
    header::{self, HeaderMap},
    ClientBuilder,
};

pub fn get_user_agent<'a>() -> &'a str {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36 Edg/138.0.0.0"
}

pub fn create_json_client() -> &'static reqwest::Client {
    static LAZZY_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    LAZZY_CLIENT.get_or_init(|| {
        let mut headers = get_default_headers();
        headers.insert(header::ACCEPT, "application/json".parse().unwrap());

        create_client_builder()
            .default_headers(headers)
            .build()
            .unwrap()
    })
}

pub fn create_client_builder() -> reqwest::ClientBuilder {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(5))
        .read_timeout(Duration::from_secs(30))
        .user_agent(get_user_agent())
}

pub fn get_default_headers() -> HeaderMap {
    let mut headers = HeaderMap::default();

    headers.insert(
        header::ACCEPT_ENCODING,
        "gzip, deflate, br".parse().unwrap(),
    );
    headers.insert(header::ACCEPT_LANGUAGE, "en-US,en;q=0.5".parse().unwrap());
    headers.insert(header::CACHE_CONTROL, "no-cache".parse().unwrap());
    headers.insert(header::PRAGMA, "no-cache".parse().unwrap());
    headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
    headers
}
