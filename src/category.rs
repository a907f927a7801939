//! Seller category policy: who buys from whom in the B2B hierarchy
//!
//! The hierarchy is fixed: importers sell to wholesalers, wholesalers sell
//! to retailers, retailers sell to end customers outside this engine. All
//! routing decisions in the engine reduce to the four rules below.

#[derive(
    minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum Category {
    /// Retailer. Buys from wholesalers, sells outside the engine.
    #[n(0)]
    Fournisseur,
    /// Wholesaler. Buys from importers, sells to retailers.
    #[n(1)]
    Grossiste,
    /// Importer. Sells to wholesalers, never buys.
    #[n(2)]
    Importateur,
}

impl Category {
    pub fn can_sell(self) -> bool {
        matches!(self, Category::Grossiste | Category::Importateur)
    }

    pub fn can_buy(self) -> bool {
        matches!(self, Category::Fournisseur | Category::Grossiste)
    }

    /// The buyer category a seller's offers are targeted at.
    pub fn selling_target(self) -> Option<Category> {
        match self {
            Category::Importateur => Some(Category::Grossiste),
            Category::Grossiste => Some(Category::Fournisseur),
            Category::Fournisseur => None,
        }
    }

    /// The target categories whose offers this viewer may see and respond to.
    pub fn visible_targets(self) -> &'static [Category] {
        match self {
            Category::Fournisseur => &[Category::Fournisseur],
            Category::Grossiste => &[Category::Grossiste],
            Category::Importateur => &[],
        }
    }
}

/// Caller identity as supplied by the surrounding application. The engine
/// trusts it as already authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub category: Category,
}

impl Actor {
    pub fn new(id: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
        }
    }
}
