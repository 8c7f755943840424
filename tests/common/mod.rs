//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use addrmatch::catalog::Catalog;
use addrmatch::config::Config;
use addrmatch::gateway::{HandlerState, create_router_with_state};
use addrmatch::matcher::MockScorer;
use addrmatch::session::{InferenceSession, load_indexer};

pub const WORD_LIST: &str = "深圳\n市\n\n南山区\n北京\n市\n";

/// `addr1 \t addr2 \t label` rows; the last one is malformed.
pub const PAIRS: &str = "深圳市\t深圳市南山区\t1\n\
                         北京\t深圳市\t0\n\
                         市\t北京市\t0\n\
                         北京市\t北京\t1\n\
                         南山区\t北京\t1\n\
                         broken row\n";

/// Writes a dictionary and a catalog into `dir` and returns a config pointing at them.
pub fn write_text_artifacts(dir: &Path, catalog: &[&str]) -> Config {
    let vocab_path = dir.join("word_dict.json");
    std::fs::write(&vocab_path, r#"{"深圳": 1, "市": 2, "南山区": 3, "北京": 4}"#).unwrap();

    let catalog_path = dir.join("unique_addresses.txt");
    std::fs::write(&catalog_path, catalog.join("\n")).unwrap();

    Config {
        vocab_path,
        catalog_path,
        checkpoint_path: dir.join("esim.safetensors"),
        vocab_size: 8,
        embedding_dim: 6,
        hidden_dim: 4,
        max_seq_len: 16,
        force_cpu: true,
        ..Default::default()
    }
}

pub fn mock_session(config: &Config) -> InferenceSession<MockScorer> {
    InferenceSession::from_parts(
        load_indexer(config).unwrap(),
        MockScorer,
        Catalog::load(&config.catalog_path).unwrap(),
    )
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// A gateway bound to an ephemeral local port, stopped on drop.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_mock_server(catalog: &[&str]) -> anyhow::Result<TestServer> {
    let dir = TempDir::new()?;
    let config = write_text_artifacts(dir.path(), catalog);
    let session = Arc::new(mock_session(&config));

    let app = create_router_with_state(HandlerState::new(session, Duration::from_secs(5)));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        addr,
        handle,
        _dir: dir,
    })
}
