#![allow(dead_code)]

use cloudant::{Client, Database, Document, DocumentMeta, IndexOptions};
use cloudant_server::config::ServerConfig;
use serde::{Deserialize, Serialize};
use std::net::TcpListener;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";
pub const DB_NAME: &str = "automobiles";

/// Start an emulator on a random port and return its base URL
pub fn spawn_server(config: ServerConfig) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = cloudant_server::run(listener, config).expect("Failed to start emulator");
    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

/// Client against a fresh emulator that requires credentials
pub fn spawn_client() -> Client {
    let url = spawn_server(ServerConfig::with_credentials(USERNAME, PASSWORD));
    Client::new(&url, USERNAME, PASSWORD).unwrap()
}

/// Client plus an empty test database
pub async fn spawn_database() -> Client {
    let client = spawn_client();
    client.create_database(DB_NAME).await.unwrap();
    client
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Automobile {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Make")]
    pub make: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Trim", default, skip_serializing_if = "String::is_empty")]
    pub trim: String,
}

impl Automobile {
    pub fn new(year: i32, make: &str, model: &str, trim: &str) -> Self {
        Self {
            meta: DocumentMeta::default(),
            year,
            make: make.to_string(),
            model: model.to_string(),
            trim: trim.to_string(),
        }
    }
}

impl Document for Automobile {
    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

pub fn automobiles() -> Vec<Automobile> {
    vec![
        Automobile::new(2000, "Lamborghini", "Diablo", ""),
        Automobile::new(2005, "Lamborghini", "Murciélago", ""),
        Automobile::new(2010, "Lamborghini", "Gallardo", "basic"),
        Automobile::new(2011, "Lamborghini", "Gallardo", "basic"),
        Automobile::new(2000, "Ferrari", "550 Maranello", "sport"),
        Automobile::new(2005, "Ferrari", "F430", ""),
        Automobile::new(2010, "Ferrari", "California", ""),
        Automobile::new(2010, "Ferrari", "458", ""),
    ]
}

/// Indexes on `Model` and `Year, Make`, then the eight automobiles
pub async fn seed_automobiles(db: &Database<'_>) {
    db.create_index(&["Model"], &IndexOptions::new()).await.unwrap();
    db.create_index(&["Year", "Make"], &IndexOptions::new()).await.unwrap();

    for auto in automobiles() {
        let created = db.create_document(&auto, false).await.unwrap();
        assert!(created.ok);
    }
}
