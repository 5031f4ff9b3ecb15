//! Automobiles Example
//!
//! Creates a database, indexes it, stores a few cars and queries them back.
//! Talks to the account named by `CLOUDANT_URL` (plus `CLOUDANT_API_KEY` and
//! `CLOUDANT_API_PASSWORD`) when set, otherwise to a local in-memory emulator.
//!
//! Run with: cargo run --example automobiles

use cloudant::{Client, Document, DocumentMeta, IndexOptions, Query};
use cloudant_server::config::ServerConfig;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::TcpListener;

#[derive(Debug, Serialize, Deserialize)]
struct Automobile {
    #[serde(flatten)]
    meta: DocumentMeta,
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Make")]
    make: String,
    #[serde(rename = "Model")]
    model: String,
}

impl Document for Automobile {
    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

fn automobile(year: i32, make: &str, model: &str) -> Automobile {
    Automobile {
        meta: DocumentMeta::default(),
        year,
        make: make.to_string(),
        model: model.to_string(),
    }
}

fn connect() -> anyhow::Result<Client> {
    if std::env::var("CLOUDANT_URL").is_ok() {
        return Ok(Client::from_env()?);
    }

    let listener = TcpListener::bind("127.0.0.1:0")?;
    let url = format!("http://{}", listener.local_addr()?);
    tokio::spawn(cloudant_server::run(listener, ServerConfig::default())?);

    println!("Using local emulator at {}\n", url);
    Ok(Client::new(&url, "", "")?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Cloudant Automobiles Example\n");

    let client = connect()?;
    let info = client.cluster_info().await?;
    println!("Connected: {} (version {})", info.couchdb, info.version);

    let db_name = "automobiles-example";
    // Ignore the error if a previous run did not leave it behind
    let _ = client.delete_database(db_name).await;
    client.create_database(db_name).await?;
    let db = client.database(db_name);

    let index = db
        .create_index(&["Year", "Make"], &IndexOptions::new().index_name("year-make"))
        .await?;
    println!("Index year-make: {} ({})\n", index.result, index.id);

    for auto in [
        automobile(2000, "Lamborghini", "Diablo"),
        automobile(2010, "Lamborghini", "Gallardo"),
        automobile(2005, "Ferrari", "F430"),
        automobile(2010, "Ferrari", "458"),
    ] {
        let created = db.create_document(&auto, false).await?;
        println!("Stored {} {} as {} @ {}", auto.make, auto.model, created.id, created.rev);
    }

    let mut query = Query::new();
    query
        .selector("Year", json!({"$gte": 2005}))
        .selector("Make", json!({"$gt": ""}))
        .sort("Year", false);

    let results: Vec<Automobile> = db.query(&query).await?;
    println!("\nAutomobiles from 2005 on, newest first:");
    for (i, auto) in results.iter().enumerate() {
        println!("   {}. {} {} {}", i + 1, auto.year, auto.make, auto.model);
    }

    if let Some(mut first) = results.into_iter().next() {
        first.model.push_str(" (restored)");
        let updated = db.update_document(&first, false).await?;
        println!("\nUpdated {} to revision {}", updated.id, updated.rev);
    }

    client.delete_database(db_name).await?;
    println!("\nCleaned up {}", db_name);

    Ok(())
}
