//! # Region Detail Presenter
//!
//! Pure projection from a region record (plus whether this visitor holds a
//! registration marker for it) to everything the detail panel renders.
//!
//! | Live | Eligibility-first | Marker | Branch                              |
//! |------|-------------------|--------|-------------------------------------|
//! | yes  | yes               | any    | check eligibility, then visit site  |
//! | yes  | no                | any    | visit site, then preview            |
//! | no   | n/a               | yes    | "you're registered", then preview   |
//! | no   | n/a               | no     | registration form inline            |

use hb_core::{Currency, Operations, Region, RegionCode, RegionStatus};
use hb_state::gate::source_context;
use serde::Serialize;

/// What an action button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Open the region's eligibility assessment.
    CheckEligibility,
    /// Leave for the region's own site.
    VisitExternal,
    /// Open the in-portal preview page.
    Preview,
}

/// One button on the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailAction {
    /// Behaviour.
    pub kind: ActionKind,
    /// Button text.
    pub label: String,
    /// Absolute URL for external actions, portal path for previews.
    pub target: String,
}

impl DetailAction {
    fn visit(region: &Region, url: &str) -> Self {
        Self {
            kind: ActionKind::VisitExternal,
            label: format!("Visit {} Site", region.display_name),
            target: url.to_string(),
        }
    }

    fn preview(code: &RegionCode) -> Self {
        Self {
            kind: ActionKind::Preview,
            label: "Preview Site".to_string(),
            target: source_context(code),
        }
    }

    fn eligibility(url: &str) -> Self {
        Self {
            kind: ActionKind::CheckEligibility,
            label: "Check Eligibility".to_string(),
            target: url.to_string(),
        }
    }
}

/// The panel's call-to-action area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "branch", rename_all = "snake_case")]
pub enum DetailBranch {
    /// Live region that leads with an eligibility check.
    EligibilityFirst {
        /// "Check Eligibility".
        primary: DetailAction,
        /// Visit the regional site.
        secondary: DetailAction,
    },
    /// Live region.
    Live {
        /// Visit the regional site.
        primary: DetailAction,
        /// Open the preview.
        secondary: DetailAction,
    },
    /// Gated region, visitor already registered.
    Registered {
        /// Confirmation heading.
        headline: String,
        /// Launch notice naming the region.
        detail: String,
        /// Open the preview.
        action: DetailAction,
    },
    /// Gated region, registration form embedded.
    RegistrationForm {
        /// Region the form registers for.
        region: RegionCode,
        /// Source page recorded with the lead.
        source_page: String,
    },
}

impl DetailBranch {
    /// The first button shown, if the branch has buttons.
    pub fn primary_action(&self) -> Option<&DetailAction> {
        match self {
            Self::EligibilityFirst { primary, .. } | Self::Live { primary, .. } => Some(primary),
            Self::Registered { action, .. } => Some(action),
            Self::RegistrationForm { .. } => None,
        }
    }

    /// Whether the registration form is embedded.
    pub fn embeds_form(&self) -> bool {
        matches!(self, Self::RegistrationForm { .. })
    }
}

/// Status badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    /// "Live" or "Coming Soon".
    pub label: String,
    /// Whether the region is live.
    pub live: bool,
}

/// Everything the detail panel shows for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDetail {
    /// Region code.
    pub code: RegionCode,
    /// Display name.
    pub name: String,
    /// Flag glyph.
    pub flag: String,
    /// Display status.
    pub status: RegionStatus,
    /// Badge subtitle.
    pub status_description: String,
    /// Live / Coming Soon badge.
    pub badge: StatusBadge,
    /// Regulator name.
    pub regulatory_body: String,
    /// Certifications, in catalog order.
    pub compliance_certifications: Vec<String>,
    /// Legal footnote.
    pub legal_note: String,
    /// Local currency.
    pub currency: Currency,
    /// Operations summary.
    pub operations: Operations,
    /// Services offered.
    pub services: Vec<String>,
    /// Feature highlights.
    pub features: Vec<String>,
    /// Call-to-action area.
    pub branch: DetailBranch,
}

/// Output of [`present`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum DetailViewModel {
    /// The region record is not available yet.
    Loading,
    /// Complete view-model.
    Ready(Box<RegionDetail>),
}

impl DetailViewModel {
    /// The detail, if loaded.
    pub fn ready(&self) -> Option<&RegionDetail> {
        match self {
            Self::Ready(detail) => Some(&**detail),
            Self::Loading => None,
        }
    }
}

/// Build the panel view-model. `None` means the record is still loading.
pub fn present(region: Option<&Region>, registration_marker_present: bool) -> DetailViewModel {
    let Some(region) = region else {
        return DetailViewModel::Loading;
    };

    let branch = match region.external_url() {
        Some(url) if region.eligibility_first => DetailBranch::EligibilityFirst {
            primary: DetailAction::eligibility(url),
            secondary: DetailAction::visit(region, url),
        },
        Some(url) => DetailBranch::Live {
            primary: DetailAction::visit(region, url),
            secondary: DetailAction::preview(&region.code),
        },
        None if registration_marker_present => DetailBranch::Registered {
            headline: "You're registered!".to_string(),
            detail: format!("We'll notify you when we launch in {}", region.display_name),
            action: DetailAction::preview(&region.code),
        },
        None => DetailBranch::RegistrationForm {
            region: region.code.clone(),
            source_page: source_context(&region.code),
        },
    };

    let live = region.is_live();
    let badge_label = if live { "Live" } else { "Coming Soon" };
    DetailViewModel::Ready(Box::new(RegionDetail {
        code: region.code.clone(),
        name: region.display_name.clone(),
        flag: region.flag.clone(),
        status: region.status,
        status_description: region.status_description.clone(),
        badge: StatusBadge {
            label: badge_label.to_string(),
            live,
        },
        regulatory_body: region.regulatory_body.clone(),
        compliance_certifications: region.compliance_certifications.clone(),
        legal_note: region.legal_note.clone(),
        currency: region.currency.clone(),
        operations: region.operations.clone(),
        services: region.services.clone(),
        features: region.features.clone(),
        branch,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_core::RegionCatalog;

    fn region(code: &str) -> Region {
        RegionCatalog::builtin().lookup(code).cloned().unwrap()
    }

    #[test]
    fn loading_when_record_absent() {
        assert_eq!(present(None, false), DetailViewModel::Loading);
        assert_eq!(present(None, true), DetailViewModel::Loading);
    }

    #[test]
    fn live_region_offers_visit_then_preview() {
        let za = region("za");
        let vm = present(Some(&za), false);
        let detail = vm.ready().unwrap();
        assert_eq!(detail.badge, StatusBadge { label: "Live".into(), live: true });
        match &detail.branch {
            DetailBranch::Live { primary, secondary } => {
                assert_eq!(primary.kind, ActionKind::VisitExternal);
                assert_eq!(primary.target, "https://healingbuds.co.za");
                assert_eq!(primary.label, "Visit South Africa Site");
                assert_eq!(secondary.kind, ActionKind::Preview);
                assert_eq!(secondary.target, "/preview/za");
            }
            other => panic!("unexpected branch {other:?}"),
        }
    }

    #[test]
    fn marker_does_not_change_live_branch() {
        let za = region("za");
        assert_eq!(present(Some(&za), true), present(Some(&za), false));
    }

    #[test]
    fn eligibility_first_leads_with_check() {
        let mut za = region("za");
        za.eligibility_first = true;
        let vm = present(Some(&za), false);
        match &vm.ready().unwrap().branch {
            DetailBranch::EligibilityFirst { primary, secondary } => {
                assert_eq!(primary.kind, ActionKind::CheckEligibility);
                assert_eq!(secondary.kind, ActionKind::VisitExternal);
                assert_eq!(secondary.target, "https://healingbuds.co.za");
            }
            other => panic!("unexpected branch {other:?}"),
        }
    }

    #[test]
    fn eligibility_flag_ignored_when_not_live() {
        let mut gb = region("gb");
        gb.eligibility_first = true;
        assert!(present(Some(&gb), false).ready().unwrap().branch.embeds_form());
    }

    #[test]
    fn gated_region_without_marker_embeds_form() {
        let gb = region("gb");
        let vm = present(Some(&gb), false);
        let detail = vm.ready().unwrap();
        assert_eq!(detail.badge.label, "Coming Soon");
        assert_eq!(
            detail.branch,
            DetailBranch::RegistrationForm {
                region: gb.code.clone(),
                source_page: "/preview/gb".into()
            }
        );
        assert!(detail.branch.primary_action().is_none());
    }

    #[test]
    fn gated_region_with_marker_confirms_and_previews() {
        let pt = region("pt");
        let vm = present(Some(&pt), true);
        match &vm.ready().unwrap().branch {
            DetailBranch::Registered { headline, detail, action } => {
                assert_eq!(headline, "You're registered!");
                assert!(detail.ends_with("Portugal"));
                assert_eq!(action.kind, ActionKind::Preview);
            }
            other => panic!("unexpected branch {other:?}"),
        }
    }

    #[test]
    fn compliance_content_is_carried_through() {
        let th = region("th");
        let vm = present(Some(&th), false);
        let detail = vm.ready().unwrap();
        assert_eq!(detail.regulatory_body, th.regulatory_body);
        assert_eq!(detail.compliance_certifications, th.compliance_certifications);
        assert_eq!(detail.features, th.features);
        assert_eq!(detail.status, RegionStatus::Production);
    }

    #[test]
    fn serializes_with_state_tag() {
        let json = serde_json::to_value(present(Some(&region("gb")), false)).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["detail"]["branch"]["branch"], "registration_form");
        assert_eq!(serde_json::to_value(DetailViewModel::Loading).unwrap()["state"], "loading");
    }
}
