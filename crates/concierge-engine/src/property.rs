//! Static property profile shown next to the chat panel.

use serde::{Deserialize, Serialize};

/// A headline figure such as "$24.5M / Property Value".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    pub value: String,
    pub label: String,
}

impl Figure {
    fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Marketing details for the tokenized property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyProfile {
    /// Issuer brand shown above the listing.
    pub brand: String,
    /// Small caps line under the brand.
    pub tagline: String,
    /// Property name, also used in investment prompts.
    pub name: String,
    /// One-paragraph pitch.
    pub summary: String,
    /// Value, yield and occupancy.
    pub headline: Vec<Figure>,
    /// Label/value rows of the "Investment Details" table.
    pub details: Vec<Figure>,
    /// Token supply breakdown.
    pub tokenization: Vec<Figure>,
}

impl Default for PropertyProfile {
    fn default() -> Self {
        Self {
            brand: "Manhattan Prime Properties".into(),
            tagline: "Premium Real Estate Investment".into(),
            name: "Midtown Executive Tower".into(),
            summary: "Class A office building in the heart of Manhattan's financial district. \
                      Prime location with stable tenancy and strong cash flow potential."
                .into(),
            headline: vec![
                Figure::new("$24.5M", "Property Value"),
                Figure::new("7.2%", "Annual Yield"),
                Figure::new("98%", "Occupancy Rate"),
            ],
            details: vec![
                Figure::new("Class A Office Building", "Property Type"),
                Figure::new("Midtown Manhattan, NY", "Location"),
                Figure::new("485,000 sq ft", "Total Square Footage"),
                Figure::new("2018", "Year Built"),
                Figure::new("$1,000", "Minimum Investment"),
                Figure::new("$10.00", "Token Price"),
            ],
            tokenization: vec![
                Figure::new("2.45M", "Total Tokens"),
                Figure::new("1.8M", "Available"),
                Figure::new("650K", "Sold"),
                Figure::new("73%", "Available"),
            ],
        }
    }
}
