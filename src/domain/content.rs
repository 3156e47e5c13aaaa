use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::{DomainError, ValidationErrors};

/// Sliders and banners share a shape; banners add a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowcaseKind {
    Slider,
    Banner,
}

impl ShowcaseKind {
    pub fn label(&self) -> &'static str {
        match self {
            ShowcaseKind::Slider => "Slider",
            ShowcaseKind::Banner => "Banner",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Showcase {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    /// Only meaningful for banners.
    pub position: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ShowcaseInput {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub position: Option<String>,
    /// `0` means "put this first": every other entry shifts down by one and
    /// this one is stored at 1.
    pub sort_order: i32,
    pub is_active: bool,
}

impl ShowcaseInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "is required");
        } else if self.title.chars().count() > 255 {
            errors.add("title", "must be at most 255 characters");
        }
        if self.image_url.trim().is_empty() {
            errors.add("image_url", "is required");
        }
        if let Some(link) = &self.link_url {
            if !(link.starts_with("http://") || link.starts_with("https://") || link.starts_with('/'))
            {
                errors.add("link_url", "must be an absolute URL or a site path");
            }
        }
        if self.sort_order < 0 {
            errors.add("sort_order", "must not be negative");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub text: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NoticeInput {
    pub text: String,
    pub is_active: bool,
}

impl NoticeInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();
        if self.text.trim().is_empty() {
            errors.add("text", "is required");
        } else if self.text.chars().count() > 500 {
            errors.add("text", "must be at most 500 characters");
        }
        errors.into_result()
    }
}

/// Home page trust badge ("Free delivery", "7 day returns", ...). The set is
/// fixed; staff only retitle or hide cards.
#[derive(Debug, Clone, Serialize)]
pub struct InfoCard {
    pub id: Uuid,
    pub title: String,
    pub subtitle: String,
    /// `heroicon`, `svg` or `image`; says how to read `icon_data`.
    pub icon_type: String,
    pub icon_data: String,
    pub bg_color: String,
    pub text_color: String,
    pub border_color: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct InfoCardUpdate {
    pub title: String,
    pub subtitle: String,
    pub is_active: bool,
}

impl InfoCardUpdate {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();
        for (field, value) in [("title", &self.title), ("subtitle", &self.subtitle)] {
            if value.trim().is_empty() {
                errors.add(field, "is required");
            } else if value.chars().count() > 255 {
                errors.add(field, "must be at most 255 characters");
            }
        }
        errors.into_result()
    }
}
