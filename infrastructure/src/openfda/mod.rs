//! openFDA enforcement API adapter

mod client;
mod types;

pub use client::OpenFdaClient;
