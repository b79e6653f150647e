//! Sector profiles for industry-aware thresholds.
//!
//! The table is static data: six industries plus the `other` fallback,
//! and the flat threshold set used by the V1 rule set.

use redflag_model::{InputError, PercentRange, SectorProfile};

/// Identifier of the universal fallback profile.
pub const FALLBACK_ID: &str = "other";

static PROFILES: [SectorProfile; 7] = [
    SectorProfile {
        id: "consultant_it",
        name: "IT Consultant / Contractor",
        profit_margin: PercentRange::new(30.0, 70.0),
        expense_ratio: PercentRange::new(20.0, 55.0),
        motor_threshold: 15.0,
        travel_threshold: 15.0,
        home_office_threshold: 10.0,
    },
    SectorProfile {
        id: "construction_cis",
        name: "Construction / CIS",
        profit_margin: PercentRange::new(15.0, 45.0),
        expense_ratio: PercentRange::new(55.0, 85.0),
        motor_threshold: 30.0,
        travel_threshold: 15.0,
        home_office_threshold: 5.0,
    },
    SectorProfile {
        id: "phv_taxi",
        name: "PHV / Taxi Driver",
        profit_margin: PercentRange::new(20.0, 50.0),
        expense_ratio: PercentRange::new(50.0, 80.0),
        motor_threshold: 60.0,
        travel_threshold: 10.0,
        home_office_threshold: 3.0,
    },
    SectorProfile {
        id: "cleaning",
        name: "Cleaning Services",
        profit_margin: PercentRange::new(25.0, 55.0),
        expense_ratio: PercentRange::new(45.0, 75.0),
        motor_threshold: 25.0,
        travel_threshold: 10.0,
        home_office_threshold: 5.0,
    },
    SectorProfile {
        id: "retail",
        name: "Retail / E-commerce",
        profit_margin: PercentRange::new(10.0, 40.0),
        expense_ratio: PercentRange::new(60.0, 90.0),
        motor_threshold: 10.0,
        travel_threshold: 8.0,
        home_office_threshold: 6.0,
    },
    SectorProfile {
        id: "hospitality",
        name: "Hospitality / Food",
        profit_margin: PercentRange::new(10.0, 35.0),
        expense_ratio: PercentRange::new(65.0, 90.0),
        motor_threshold: 8.0,
        travel_threshold: 5.0,
        home_office_threshold: 4.0,
    },
    SectorProfile {
        id: FALLBACK_ID,
        name: "Other / General",
        profit_margin: PercentRange::new(30.0, 55.0),
        expense_ratio: PercentRange::new(45.0, 70.0),
        motor_threshold: 35.0,
        travel_threshold: 20.0,
        home_office_threshold: 8.0,
    },
];

// Thresholds of the original flat rule list.
static FLAT: SectorProfile = SectorProfile {
    id: "flat",
    name: "Flat thresholds",
    profit_margin: PercentRange::new(10.0, 60.0),
    expense_ratio: PercentRange::new(0.0, 55.0),
    motor_threshold: 35.0,
    travel_threshold: 20.0,
    home_office_threshold: 8.0,
};

/// All built-in profiles, fallback last.
pub fn profiles() -> &'static [SectorProfile] {
    &PROFILES
}

/// The `other` profile.
pub fn fallback() -> &'static SectorProfile {
    &PROFILES[PROFILES.len() - 1]
}

/// Thresholds used by the V1 rule set regardless of industry.
pub fn flat_profile() -> &'static SectorProfile {
    &FLAT
}

fn find(id: &str) -> Option<&'static SectorProfile> {
    let id = id.trim();
    PROFILES.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}

/// Profile for an industry id, falling back to `other`. Never fails.
pub fn profile_for(industry: Option<&str>) -> &'static SectorProfile {
    match industry {
        None => fallback(),
        Some(id) => find(id).unwrap_or_else(|| {
            tracing::debug!(industry = %id, "Unknown industry, using fallback profile");
            fallback()
        }),
    }
}

/// Strict lookup for intake validation.
pub fn lookup(industry: &str) -> Result<&'static SectorProfile, InputError> {
    find(industry).ok_or_else(|| InputError::UnknownIndustry(industry.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_are_consistent() {
        for profile in profiles().iter().chain(std::iter::once(flat_profile())) {
            assert!(profile.is_consistent(), "{} is inconsistent", profile.id);
        }
    }

    #[test]
    fn test_profile_ids_unique() {
        let mut ids: Vec<_> = profiles().iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), profiles().len());
        assert_eq!(profiles().len(), 7);
    }

    #[test]
    fn test_profile_for_match() {
        let profile = profile_for(Some("construction_cis"));
        assert_eq!(profile.name, "Construction / CIS");
        assert_eq!(profile_for(Some(" Consultant_IT ")).id, "consultant_it");
    }

    #[test]
    fn test_profile_for_fallback() {
        assert_eq!(profile_for(None).id, FALLBACK_ID);
        assert_eq!(profile_for(Some("astronaut")).id, FALLBACK_ID);
        assert_eq!(profile_for(Some("")).id, FALLBACK_ID);
    }

    #[test]
    fn test_lookup_is_strict() {
        assert_eq!(lookup("phv_taxi").map(|p| p.id), Ok("phv_taxi"));
        assert_eq!(
            lookup("astronaut"),
            Err(InputError::UnknownIndustry("astronaut".to_string()))
        );
    }

    #[test]
    fn test_flat_profile_not_in_catalog() {
        assert_eq!(profile_for(Some("flat")).id, FALLBACK_ID);
        assert!(lookup("flat").is_err());
    }

    #[test]
    fn test_consultant_thresholds() {
        let profile = profile_for(Some("consultant_it"));
        assert_eq!(profile.profit_margin, PercentRange::new(30.0, 70.0));
        assert_eq!(profile.expense_ratio, PercentRange::new(20.0, 55.0));
    }
}
