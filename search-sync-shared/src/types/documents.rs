//! Document types for the search indices.
//!
//! A document is the denormalized projection of one relational row. Its `id`
//! equals the row's primary key and is the index document identifier, which
//! makes every write an idempotent replace-by-id.

use serde::{Deserialize, Serialize};

/// Organization fields embedded into event and job documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSummary {
    pub id: i64,
    pub name: String,
    pub pic_url: Option<String>,
}

/// A category reference, shaped like the API's select options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRef {
    pub value: i64,
    pub label: String,
}

/// A job prerequisite reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrerequisiteRef {
    pub title: String,
    pub link: Option<String>,
}

/// Document stored in the events index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    pub id: i64,
    pub name: String,
    pub pic_url: Option<String>,
    pub content: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location_name: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub location_type: Option<String>,
    pub organization: Option<OrganizationSummary>,
    pub categories: Vec<CategoryRef>,
    pub audience: Option<i32>,
    pub price: Option<f64>,
    pub updated_at: String,
}

/// Document stored in the jobs index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobDocument {
    pub id: i64,
    pub title: String,
    pub pic_url: Option<String>,
    pub scope: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub workplace_type: Option<String>,
    pub work_type: Option<String>,
    pub period: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub hours_per_day: Option<i32>,
    pub qualifications: Option<String>,
    pub benefits: Option<String>,
    pub organization: Option<OrganizationSummary>,
    pub categories: Vec<CategoryRef>,
    pub prerequisites: Vec<PrerequisiteRef>,
    pub updated_at: String,
}

/// Document stored in the organizations index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDocument {
    pub id: i64,
    pub name: String,
    pub pic_url: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub updated_at: String,
}
