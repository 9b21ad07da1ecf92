//! Relational records returned by the lookups.
//!
//! A record is the authoritative state of one row, read by primary key with
//! its associations already loaded. Reconstructors turn records into
//! documents; nothing here knows about the search index.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// The organization columns embedded into event and job records.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationSummaryRecord {
    pub id: i64,
    pub name: String,
    pub pic_url: Option<String>,
}

/// A category association.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    pub id: i64,
    pub label: String,
}

/// A job prerequisite row.
#[derive(Debug, Clone, PartialEq)]
pub struct PrerequisiteRecord {
    pub id: i64,
    pub title: String,
    pub link: Option<String>,
}

/// An `events` row with its organization and categories.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: i64,
    pub name: String,
    pub pic_url: Option<String>,
    pub content: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location_name: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub location_type: Option<String>,
    pub audience: Option<i32>,
    pub price: Option<f64>,
    pub updated_at: NaiveDateTime,
    pub organization: Option<OrganizationSummaryRecord>,
    pub categories: Vec<CategoryRecord>,
}

/// A `jobs` row with its organization, categories and prerequisites.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
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
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub hours_per_day: Option<i32>,
    pub qualifications: Option<String>,
    pub benefits: Option<String>,
    pub updated_at: NaiveDateTime,
    pub organization: Option<OrganizationSummaryRecord>,
    pub categories: Vec<CategoryRecord>,
    pub prerequisites: Vec<PrerequisiteRecord>,
}

/// An `organization` row.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationRecord {
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
    pub updated_at: NaiveDateTime,
}
