//! Quick-action shortcuts offered under the welcome message.
//!
//! A quick action only pre-fills the pending input. Sending stays an explicit
//! user step.

use serde::{Deserialize, Serialize};

/// One of the four fixed shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    /// Buy 100 tokens ($1,000).
    BuyHundredTokens,
    /// Buy 500 tokens ($5,000).
    BuyFiveHundredTokens,
    /// Ask to invest a custom amount.
    CustomAmount,
    /// Ask for property analytics.
    ViewAnalytics,
}

/// What a quick action writes into the pending input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickActionTarget {
    /// An investment amount, composed through [`invest_prompt`].
    Invest(&'static str),
    /// A free-form prompt used verbatim.
    Prompt(&'static str),
}

impl QuickAction {
    /// All quick actions, in display order.
    pub const ALL: [QuickAction; 4] = [
        QuickAction::BuyHundredTokens,
        QuickAction::BuyFiveHundredTokens,
        QuickAction::CustomAmount,
        QuickAction::ViewAnalytics,
    ];

    /// Button label shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Self::BuyHundredTokens => "Buy 100 tokens ($1,000)",
            Self::BuyFiveHundredTokens => "Buy 500 tokens ($5,000)",
            Self::CustomAmount => "Custom amount",
            Self::ViewAnalytics => "View detailed analytics",
        }
    }

    pub fn target(self) -> QuickActionTarget {
        match self {
            Self::BuyHundredTokens => QuickActionTarget::Invest("$1,000"),
            Self::BuyFiveHundredTokens => QuickActionTarget::Invest("$5,000"),
            Self::CustomAmount => QuickActionTarget::Prompt("I'd like to invest a custom amount"),
            Self::ViewAnalytics => {
                QuickActionTarget::Prompt("Show me detailed analytics for this property")
            }
        }
    }

    /// Position in [`QuickAction::ALL`] (zero-based).
    pub fn index(self) -> usize {
        match self {
            Self::BuyHundredTokens => 0,
            Self::BuyFiveHundredTokens => 1,
            Self::CustomAmount => 2,
            Self::ViewAnalytics => 3,
        }
    }

    /// Look up a quick action by its zero-based position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Compose the canned investment sentence for `amount_label`.
pub fn invest_prompt(amount_label: &str, property_name: &str) -> String {
    format!("I'd like to invest {amount_label} in the {property_name}")
}
