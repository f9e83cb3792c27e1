//! Fetches a JSON document and validates it against a typed schema.
//!
//! Run with:
//! `cargo run --example get_json --features http-client-reqwest-0_12`

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::json;

use sendill::{Fetcher, QueryBuilder, UrlBuilder, schema};

#[derive(Debug, Deserialize)]
struct Todo {
    id: u32,
    title: String,
    completed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let http_client = reqwest::Client::new();

    let mut url = UrlBuilder::builder("https://jsonplaceholder.typicode.com")
        .path("/todos/:id")
        .query_builder(QueryBuilder::new(json!({ "expand": "user" }))?)
        .build()?;
    url.replace_path_params(&HashMap::from([("id", "1")]))?;

    let todo: Todo = Fetcher::get(&url)
        .schema(&schema::Json::new())
        .call(&http_client)
        .await?;

    println!("#{} {} (completed: {})", todo.id, todo.title, todo.completed);
    Ok(())
}
