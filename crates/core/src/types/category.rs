//! Canonical directory category taxonomy.
//!
//! Every top-level category has a stable ID (used in stored data), a display
//! name, the page path of its listing page, and the store key of its business
//! index. Lookups accept the stable ID or the page path exactly; nothing is
//! inferred from free text.

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known category.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0:?}")]
pub struct CategoryError(pub String);

/// Top-level business categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    HomeLawnLabor,
    RetailStores,
    TravelVacation,
    Tailors,
    ArtDesignEntertainment,
    PhysicalRehabilitation,
    FinanceInsurance,
    WeddingsEvents,
    PetCare,
    LanguageTutoring,
    #[serde(rename = "realestate")]
    RealEstate,
    Athletics,
    Music,
    #[serde(rename = "homecare")]
    HomeCare,
    Automotive,
    Beauty,
    Medical,
    Counseling,
    Computers,
    Restaurant,
    PersonalAssistant,
    MortuaryServices,
    Lawyers,
}

impl Category {
    /// Every category, in directory display order.
    pub const ALL: [Self; 23] = [
        Self::HomeLawnLabor,
        Self::RetailStores,
        Self::TravelVacation,
        Self::Tailors,
        Self::ArtDesignEntertainment,
        Self::PhysicalRehabilitation,
        Self::FinanceInsurance,
        Self::WeddingsEvents,
        Self::PetCare,
        Self::LanguageTutoring,
        Self::RealEstate,
        Self::Athletics,
        Self::Music,
        Self::HomeCare,
        Self::Automotive,
        Self::Beauty,
        Self::Medical,
        Self::Counseling,
        Self::Computers,
        Self::Restaurant,
        Self::PersonalAssistant,
        Self::MortuaryServices,
        Self::Lawyers,
    ];

    /// Stable identifier stored alongside business data.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::HomeLawnLabor => "homeLawnLabor",
            Self::RetailStores => "retailStores",
            Self::TravelVacation => "travelVacation",
            Self::Tailors => "tailors",
            Self::ArtDesignEntertainment => "artDesignEntertainment",
            Self::PhysicalRehabilitation => "physicalRehabilitation",
            Self::FinanceInsurance => "financeInsurance",
            Self::WeddingsEvents => "weddingsEvents",
            Self::PetCare => "petCare",
            Self::LanguageTutoring => "languageTutoring",
            Self::RealEstate => "realestate",
            Self::Athletics => "athletics",
            Self::Music => "music",
            Self::HomeCare => "homecare",
            Self::Automotive => "automotive",
            Self::Beauty => "beauty",
            Self::Medical => "medical",
            Self::Counseling => "counseling",
            Self::Computers => "computers",
            Self::Restaurant => "restaurant",
            Self::PersonalAssistant => "personalAssistant",
            Self::MortuaryServices => "mortuaryServices",
            Self::Lawyers => "lawyers",
        }
    }

    /// Human-readable category name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::HomeLawnLabor => "Home, Lawn, and Manual Labor",
            Self::RetailStores => "Retail Stores",
            Self::TravelVacation => "Travel and Vacation",
            Self::Tailors => "Tailors, Dressmakers, and Fabric and Clothes Cleaning and Repair",
            Self::ArtDesignEntertainment => "Art, Design and Entertainment",
            Self::PhysicalRehabilitation => "Physical Rehabilitation",
            Self::FinanceInsurance => "Insurance, Finance, Debt and Sales",
            Self::WeddingsEvents => "Weddings and Special Events",
            Self::PetCare => "Pet Care",
            Self::LanguageTutoring => "Language Lessons/School Subject Tutoring",
            Self::RealEstate => "Home Buying and Selling",
            Self::Athletics => {
                "Athletics, Personal Trainers, Group Fitness Classes and Dance Instruction"
            }
            Self::Music => "Music",
            Self::HomeCare => "Home Care",
            Self::Automotive => "Automotive/Motorcycle/RV, etc",
            Self::Beauty => "Hair care, Beauty, Tattoo and Piercing",
            Self::Medical => "Medical Practitioners - non MD/DO",
            Self::Counseling => "Counselors, Psychologists, Addiction Specialists, Team Building",
            Self::Computers => "Computers and the Web",
            Self::Restaurant => "Restaurant, Food and Drink",
            Self::PersonalAssistant => "Assistants",
            Self::MortuaryServices => "Mortuary Services",
            Self::Lawyers => "Lawyers",
        }
    }

    /// Path of the category's listing page.
    #[must_use]
    pub const fn page_path(self) -> &'static str {
        match self {
            Self::HomeLawnLabor => "/home-improvement",
            Self::RetailStores => "/retail-stores",
            Self::TravelVacation => "/travel-vacation",
            Self::Tailors => "/tailoring-clothing",
            Self::ArtDesignEntertainment => "/arts-entertainment",
            Self::PhysicalRehabilitation => "/physical-rehabilitation",
            Self::FinanceInsurance => "/financial-services",
            Self::WeddingsEvents => "/weddings-events",
            Self::PetCare => "/pet-care",
            Self::LanguageTutoring => "/education-tutoring",
            Self::RealEstate => "/real-estate",
            Self::Athletics => "/fitness-athletics",
            Self::Music => "/music-lessons",
            Self::HomeCare => "/care-services",
            Self::Automotive => "/automotive-services",
            Self::Beauty => "/beauty-wellness",
            Self::Medical => "/medical-practitioners",
            Self::Counseling => "/mental-health",
            Self::Computers => "/tech-it-services",
            Self::Restaurant => "/food-dining",
            Self::PersonalAssistant => "/personal-assistants",
            Self::MortuaryServices => "/funeral-services",
            Self::Lawyers => "/legal-services",
        }
    }

    /// Store key of the set of businesses listed under this category.
    #[must_use]
    pub fn index_key(self) -> String {
        format!("category:{}:businesses", self.id())
    }

    /// Look up a category by its stable ID.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Look up a category by its listing page path.
    ///
    /// Trailing slashes and ASCII case are ignored.
    #[must_use]
    pub fn from_page_path(path: &str) -> Option<Self> {
        let path = path.trim().trim_end_matches('/');
        Self::ALL
            .into_iter()
            .find(|c| c.page_path().eq_ignore_ascii_case(path))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s)
            .or_else(|| Self::from_page_path(s))
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = Category::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), Category::ALL.len());
        let paths: HashSet<_> = Category::ALL.iter().map(|c| c.page_path()).collect();
        assert_eq!(paths.len(), Category::ALL.len());
    }

    #[test]
    fn test_serde_matches_id() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.id()));
            let back: Category = serde_json::from_str(&json).unwrap();
            assert_eq!(back, category);
        }
    }

    #[test]
    fn test_parse_by_id_and_path() {
        assert_eq!("lawyers".parse::<Category>().unwrap(), Category::Lawyers);
        assert_eq!(
            "/funeral-services".parse::<Category>().unwrap(),
            Category::MortuaryServices
        );
        assert_eq!(
            Category::from_page_path("/Real-Estate/"),
            Some(Category::RealEstate)
        );
    }

    #[test]
    fn test_parse_rejects_variants() {
        // Spelling variants are not guessed at.
        assert!("mortuary-services".parse::<Category>().is_err());
        assert!("Lawyers".parse::<Category>().is_err());
        assert!("auto repair".parse::<Category>().is_err());
    }

    #[test]
    fn test_index_key() {
        assert_eq!(Category::PetCare.index_key(), "category:petCare:businesses");
    }
}
