//! Shared fixtures for the client tests.

use std::sync::Arc;

use payload_store::InMemoryPayloadStore;
use payload_types::{
    DataAccessDescriptor, LocDataElementType, LocElementDataReferenceDescriptor,
    LocElementMetadata, TypedMetadata,
};
use serde::{Deserialize, Serialize};

use crate::api::PayloadApiClient;
use crate::config::ClientConfig;
use crate::metrics::RecordingMetrics;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub name: String,
}

impl Widget {
    pub fn new(name: &str) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub score: u32,
    pub reviewer: String,
}

impl Review {
    pub fn scored(score: u32) -> Self {
        Self {
            score,
            reviewer: format!("reviewer-{score}"),
        }
    }
}

impl TypedMetadata for Review {
    const METADATA_TYPE: &'static str = "Review";
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

impl Label {
    pub fn new(name: &str) -> Self {
        Self { name: name.into() }
    }
}

impl TypedMetadata for Label {
    const METADATA_TYPE: &'static str = "Label";
}

pub fn descriptor(file_name: &str) -> LocElementDataReferenceDescriptor {
    LocElementDataReferenceDescriptor {
        data_access: DataAccessDescriptor {
            data_access_source_id: "blob-primary".into(),
            relative_access_path: format!("loc/en-US/{file_name}"),
        },
        metadata: LocElementMetadata {
            group_id: "group-1".into(),
            id: format!("elem-{file_name}"),
            original_file_name: file_name.into(),
            original_relative_path: format!("src/{file_name}"),
            loc_data_element_type: LocDataElementType::Text,
        },
    }
}

/// API client over a fresh in-memory store, paging `page_size` items at a time.
pub async fn connect(page_size: usize) -> (PayloadApiClient, Arc<InMemoryPayloadStore>) {
    let store = Arc::new(InMemoryPayloadStore::new());
    let config = ClientConfig {
        page_size,
        ..ClientConfig::default()
    };
    let api = PayloadApiClient::connect(config, store.clone())
        .await
        .expect("in-memory store is reachable");
    (api, store)
}

/// Like [`connect`], recording every operation timing.
pub async fn connect_recorded(
    page_size: usize,
) -> (PayloadApiClient, Arc<InMemoryPayloadStore>, Arc<RecordingMetrics>) {
    let store = Arc::new(InMemoryPayloadStore::new());
    let metrics = Arc::new(RecordingMetrics::new());
    let config = ClientConfig {
        page_size,
        ..ClientConfig::default()
    };
    let api = PayloadApiClient::connect_with_metrics(config, store.clone(), metrics.clone())
        .await
        .expect("in-memory store is reachable");
    (api, store, metrics)
}
