//! Database seeder for campus CMS development and testing.
//!
//! Seeds a set of departments and prints a bearer token for local editing.
//!
//! Usage: cargo run --bin seeder

use std::collections::HashMap;

use anyhow::Context;
use serde_json::json;

use campus_core::catalog::DEPARTMENT;
use campus_core::resource::{
    ResourceRepository as ResourceRepoTrait, coerce_create, parse_list_query,
};
use campus_db::{ResourceRepository, connect};
use campus_shared::{AppConfig, JwtConfig, JwtService};

const DEPARTMENTS: [(&str, &str); 4] = [
    ("Computer Science", "CS"),
    ("Physics", "PHY"),
    ("Chemistry", "CHEM"),
    ("Mathematics", "MATH"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let repo = ResourceRepository::new(db);

    println!("Seeding departments...");
    seed_departments(&repo).await?;

    let jwt = JwtService::new(JwtConfig {
        secret: config.auth.jwt_secret.clone(),
        ..JwtConfig::default()
    });
    let token = jwt.generate_token("seeder@campus.local", "editor")?;
    println!("Development token:\n  Bearer {token}");

    println!("Seeding complete!");
    Ok(())
}

/// Seeds departments, skipping codes that already exist.
async fn seed_departments(repo: &ResourceRepository) -> anyhow::Result<()> {
    for (name, code) in DEPARTMENTS {
        let params = HashMap::from([("code".to_string(), code.to_string())]);
        let query = parse_list_query(&DEPARTMENT, &params)?;
        if !repo.list(&DEPARTMENT, &query).await?.is_empty() {
            println!("  {code} already exists, skipping...");
            continue;
        }

        let (key, changes) = coerce_create(&DEPARTMENT, &json!({ "name": name, "code": code }))?;
        let id = repo.insert(&DEPARTMENT, key, &changes).await?;
        println!("  Created {name} ({code}) as {id}");
    }
    Ok(())
}
