#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use blobstore::api::create_router;
use blobstore::config::Config;
use blobstore::storage::FileStore;
use blobstore::utils::jwt::gen_token;
use blobstore::utils::state::AppState;
use tokio::net::TcpListener;

pub const SECRET: &str = "test-secret";
pub const TAR: &str = "application/x-tar";

pub struct TestServer {
    pub addr: SocketAddr,
    pub base: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn upload(&self, token: &str, content_type: &str, data: Vec<u8>) -> reqwest::Response {
        self.client
            .post(self.url("/api/v1/files"))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .unwrap()
    }

    pub async fn download(&self, hash: &str) -> reqwest::Response {
        self.client
            .get(self.url(&format!("/api/v1/files/{hash}")))
            .send()
            .await
            .unwrap()
    }
}

pub fn test_config() -> Config {
    Config {
        jwt_secret: SECRET.to_string(),
        ..Config::default()
    }
}

pub fn token_for(user: &str) -> String {
    gen_token(3600, SECRET, user).unwrap()
}

pub async fn spawn(config: Config, store: Arc<dyn FileStore>) -> TestServer {
    let state = Arc::new(AppState::new(config, store));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });
    TestServer {
        addr,
        base: format!("http://{addr}"),
        client: reqwest::Client::new(),
    }
}
