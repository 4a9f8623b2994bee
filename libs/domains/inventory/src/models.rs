use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Thumbnail shown for every deleted product.
///
/// Applied to `images[0]` after each fetch; never sent back to the service.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://cdn.dummyjson.com/products/images/beauty/Essence%20Mascara%20Lash%20Princess/1.png";

/// Selection label that clears the category filter
pub const CLEAR_CATEGORY_LABEL: &str = "clear";

/// Product category offered by the category filter
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Category {
    Gemstones,
    Jewelry,
    DropsBeads,
    Semimounts,
    Findings,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Parse a filter selection. `clear` and the empty string unset the filter.
    ///
    /// Labels are case-sensitive, matching how items are compared.
    pub fn from_selection(label: &str) -> Result<Option<Self>, strum::ParseError> {
        let label = label.trim();
        if label.is_empty() || label == CLEAR_CATEGORY_LABEL {
            return Ok(None);
        }
        label.parse().map(Some)
    }
}

/// Ordering applied to the filtered view
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum SortOption {
    #[default]
    #[strum(serialize = "A to Z")]
    #[serde(rename = "A to Z")]
    AToZ,
    #[strum(serialize = "Z to A")]
    #[serde(rename = "Z to A")]
    ZToA,
    #[strum(serialize = "Lowest Price")]
    #[serde(rename = "Lowest Price")]
    LowestPrice,
    #[strum(serialize = "Highest Price")]
    #[serde(rename = "Highest Price")]
    HighestPrice,
    /// Fallback for unrecognized labels: keeps filter order
    #[strum(serialize = "Unordered")]
    #[serde(other)]
    Unordered,
}

impl SortOption {
    /// The four options offered to users
    pub const SELECTABLE: [SortOption; 4] = [
        SortOption::AToZ,
        SortOption::ZToA,
        SortOption::LowestPrice,
        SortOption::HighestPrice,
    ];

    /// Map a selection label to an option; anything unknown is `Unordered`.
    pub fn from_label(label: &str) -> Self {
        label.trim().parse().unwrap_or(SortOption::Unordered)
    }
}

/// A soft-deleted inventory record as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord")]
pub struct Item {
    /// Row key (`_id` on the wire)
    #[serde(rename = "_id")]
    pub id: String,
    /// Stock-keeping code, the restore key
    pub sku: String,
    pub name: String,
    /// Raw category; may be absent or outside [`Category`]
    pub category: Option<String>,
    pub price: f64,
    pub images: Vec<String>,
    /// `false` while deleted, `true` once restored
    pub status: bool,
}

/// Wire shape of an item. Records may carry `_id`, `id`, or both.
#[derive(Deserialize)]
struct ItemRecord {
    #[serde(rename = "_id")]
    document_id: Option<String>,
    id: Option<String>,
    sku: String,
    name: String,
    #[serde(default)]
    category: Option<String>,
    price: f64,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    status: bool,
}

impl TryFrom<ItemRecord> for Item {
    type Error = String;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        let id = record
            .document_id
            .or(record.id)
            .ok_or_else(|| "missing field `_id`".to_string())?;

        Ok(Self {
            id,
            sku: record.sku,
            name: record.name,
            category: record.category,
            price: record.price,
            images: record.images,
            status: record.status,
        })
    }
}

impl Item {
    /// Exact, case-sensitive category match. `None` matches every item.
    pub fn matches_category(&self, category: Option<Category>) -> bool {
        match category {
            None => true,
            Some(category) => self.category.as_deref() == Some(category.as_str()),
        }
    }

    /// Case-insensitive substring match on `name`. An empty term matches.
    pub fn matches_search(&self, term: &str) -> bool {
        term.is_empty() || self.name.to_lowercase().contains(&term.to_lowercase())
    }

    /// Overwrite the first image, inserting one if the list is empty
    pub fn apply_placeholder_image(&mut self, url: &str) {
        match self.images.first_mut() {
            Some(first) => *first = url.to_string(),
            None => self.images.push(url.to_string()),
        }
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Body of the change-status command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub status: bool,
}

impl ChangeStatus {
    pub fn restore() -> Self {
        Self { status: true }
    }
}

/// Search, category and sort selections that shape the view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewQuery {
    pub search_term: String,
    pub category: Option<Category>,
    pub sort: SortOption,
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub sku: String,
    pub price: f64,
    pub thumbnail: Option<String>,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            sku: item.sku.clone(),
            price: item.price,
            thumbnail: item.thumbnail().map(str::to_string),
        }
    }
}

/// Progress of the most recent restore of one SKU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RestorePhase {
    #[default]
    Idle,
    Requesting,
    Reloading,
    Succeeded,
    Failed,
}
