//! Business service areas.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{BusinessId, ZipCode};

/// The ZIP codes a business has declared it serves.
///
/// A service area is replaced wholesale whenever the business edits it; it is
/// never merged with the previous version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessServiceArea {
    pub business_id: BusinessId,
    /// ZIP codes explicitly served. Advisory only when `is_nationwide`.
    #[serde(default)]
    pub zip_codes: BTreeSet<ZipCode>,
    #[serde(default)]
    pub is_nationwide: bool,
}

impl BusinessServiceArea {
    /// A service area covering an explicit list of ZIP codes.
    #[must_use]
    pub fn with_zip_codes(
        business_id: BusinessId,
        zip_codes: impl IntoIterator<Item = ZipCode>,
    ) -> Self {
        Self {
            business_id,
            zip_codes: zip_codes.into_iter().collect(),
            is_nationwide: false,
        }
    }

    /// A nationwide service area.
    #[must_use]
    pub const fn nationwide(business_id: BusinessId) -> Self {
        Self {
            business_id,
            zip_codes: BTreeSet::new(),
            is_nationwide: true,
        }
    }

    /// Whether the business serves `zip`.
    ///
    /// Nationwide businesses serve every ZIP. Otherwise this is an exact
    /// membership test; nearby ZIPs do not count.
    #[must_use]
    pub fn is_served_zip(&self, zip: &ZipCode) -> bool {
        self.is_nationwide || self.zip_codes.contains(zip)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn zip(s: &str) -> ZipCode {
        ZipCode::parse(s).unwrap()
    }

    fn business() -> BusinessId {
        BusinessId::parse("biz-1").unwrap()
    }

    #[test]
    fn test_nationwide_serves_everything() {
        let area = BusinessServiceArea::nationwide(business());
        assert!(area.is_served_zip(&zip("99999")));
        assert!(area.is_served_zip(&zip("00501")));
    }

    #[test]
    fn test_nationwide_ignores_listed_zips() {
        let mut area = BusinessServiceArea::with_zip_codes(business(), [zip("44718")]);
        area.is_nationwide = true;
        assert!(area.is_served_zip(&zip("10001")));
    }

    #[test]
    fn test_exact_membership() {
        let area = BusinessServiceArea::with_zip_codes(business(), [zip("44718")]);
        assert!(area.is_served_zip(&zip("44718")));
        assert!(!area.is_served_zip(&zip("44719")));
    }

    #[test]
    fn test_empty_area_serves_nothing() {
        let area = BusinessServiceArea::with_zip_codes(business(), []);
        assert!(!area.is_served_zip(&zip("44718")));
    }

    #[test]
    fn test_duplicates_collapse() {
        let area =
            BusinessServiceArea::with_zip_codes(business(), [zip("44718"), zip("44718")]);
        assert_eq!(area.zip_codes.len(), 1);
    }

    #[test]
    fn test_json_shape() {
        let area = BusinessServiceArea::with_zip_codes(business(), [zip("44718")]);
        let json = serde_json::to_value(&area).unwrap();
        assert_eq!(json["businessId"], "biz-1");
        assert_eq!(json["zipCodes"][0], "44718");
        assert_eq!(json["isNationwide"], false);
    }
}
