//! Free-text status normalization.

use crate::model::status::ProjectStatus;

/// Synonym table in match order. Exact matches are tried first, then
/// two-way substring containment in this same order.
const STATUS_SYNONYMS: &[(&str, ProjectStatus)] = &[
    ("active", ProjectStatus::Active),
    ("ongoing", ProjectStatus::Active),
    ("in progress", ProjectStatus::Active),
    ("on hold", ProjectStatus::OnHold),
    ("onhold", ProjectStatus::OnHold),
    ("hold", ProjectStatus::OnHold),
    ("paused", ProjectStatus::OnHold),
    ("completed", ProjectStatus::Completed),
    ("complete", ProjectStatus::Completed),
    ("finished", ProjectStatus::Completed),
    ("done", ProjectStatus::Completed),
    ("cancelled", ProjectStatus::Cancelled),
    ("canceled", ProjectStatus::Cancelled),
    ("terminated", ProjectStatus::Cancelled),
    ("stopped", ProjectStatus::Cancelled),
    ("abandoned", ProjectStatus::Cancelled),
];

/// Outcome of normalizing one status cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusNormalization {
    pub status: ProjectStatus,
    /// `false` when the input matched nothing and `Active` was assumed.
    pub recognized: bool,
}

/// Maps a human-entered status to a canonical one.
///
/// Blank input is the documented default (`Active`, recognized). Unknown
/// text also yields `Active`, with `recognized = false` so callers can flag
/// it.
pub fn normalize_status(raw: &str) -> StatusNormalization {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return StatusNormalization {
            status: ProjectStatus::Active,
            recognized: true,
        };
    }

    let exact = STATUS_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == lowered);
    let matched = exact.or_else(|| {
        STATUS_SYNONYMS.iter().find(|(synonym, _)| {
            lowered.contains(synonym) || synonym.contains(lowered.as_str())
        })
    });

    match matched {
        Some((_, status)) => StatusNormalization {
            status: *status,
            recognized: true,
        },
        None => StatusNormalization {
            status: ProjectStatus::Active,
            recognized: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_status;
    use crate::model::status::ProjectStatus;

    #[test]
    fn exact_match_is_case_insensitive() {
        assert_eq!(normalize_status(" DONE ").status, ProjectStatus::Completed);
        assert_eq!(normalize_status("Canceled").status, ProjectStatus::Cancelled);
    }

    #[test]
    fn substring_fallback_uses_table_order() {
        let result = normalize_status("temporarily on hold");
        assert_eq!(result.status, ProjectStatus::OnHold);
        assert!(result.recognized);
    }

    #[test]
    fn blank_defaults_to_active_without_flag() {
        let result = normalize_status("   ");
        assert_eq!(result.status, ProjectStatus::Active);
        assert!(result.recognized);
    }
}
