//! # Region Catalog
//!
//! The static table of known regions, the fixed keyboard traversal order,
//! and the domains of the global entry point. Loaded once, immutable
//! afterwards, shared by reference.
//!
//! ## Invariants (checked by [`RegionCatalog::new`])
//!
//! - At least one region; codes are unique; `global` is not a region code.
//! - A NEXT region never carries an external URL.
//! - External URLs parse as absolute `http`/`https` URLs.
//! - Domains are non-empty, lower-case, and claimed by one owner only.
//! - The traversal order lists every region exactly once.
//!
//! ## YAML schema
//!
//! ```yaml
//! global_domains: [healingbuds.com]
//! traversal_order: [za, gb]
//! regions:
//!   - code: za
//!     display_name: South Africa
//!     ...
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::identity::RegionCode;
use crate::region::{Coordinates, Currency, Operations, Region, RegionStatus};

/// On-disk shape of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    global_domains: Vec<String>,
    traversal_order: Vec<RegionCode>,
    regions: Vec<Region>,
}

/// Immutable, validated table of regions.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    traversal_order: Vec<RegionCode>,
    global_domains: Vec<String>,
    index: HashMap<RegionCode, usize>,
}

impl RegionCatalog {
    /// Build a catalog, enforcing every invariant listed in the module docs.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] encountered.
    pub fn new(
        regions: Vec<Region>,
        traversal_order: Vec<RegionCode>,
        global_domains: Vec<String>,
    ) -> Result<Self, CatalogError> {
        if regions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(regions.len());
        let mut domain_owner: HashMap<&str, &RegionCode> = HashMap::new();
        let global = RegionCode::global();

        for domain in &global_domains {
            check_domain(&global, domain)?;
            if let Some(first) = domain_owner.insert(domain.as_str(), &global) {
                return Err(duplicate_domain(domain, first, &global));
            }
        }

        for (i, region) in regions.iter().enumerate() {
            if region.code.is_global() {
                return Err(CatalogError::ReservedCode(region.code.clone()));
            }
            if index.insert(region.code.clone(), i).is_some() {
                return Err(CatalogError::DuplicateRegion(region.code.clone()));
            }
            if !region.coordinates.is_valid() {
                return Err(CatalogError::InvalidCoordinates {
                    code: region.code.clone(),
                    lat: region.coordinates.lat,
                    lng: region.coordinates.lng,
                });
            }
            if let Some(url) = &region.external_url {
                if region.status == RegionStatus::Next {
                    return Err(CatalogError::NextWithExternalUrl(region.code.clone()));
                }
                check_external_url(&region.code, url)?;
            }
            for domain in &region.domains {
                check_domain(&region.code, domain)?;
                if let Some(first) = domain_owner.insert(domain.as_str(), &region.code) {
                    return Err(duplicate_domain(domain, first, &region.code));
                }
            }
        }

        let mut seen = std::collections::HashSet::with_capacity(traversal_order.len());
        for code in &traversal_order {
            if !index.contains_key(code) {
                return Err(CatalogError::TraversalUnknown(code.clone()));
            }
            if !seen.insert(code) {
                return Err(CatalogError::TraversalDuplicate(code.clone()));
            }
        }
        if let Some(missing) = regions.iter().find(|r| !seen.contains(&r.code)) {
            return Err(CatalogError::TraversalMissing(missing.code.clone()));
        }

        Ok(Self {
            regions,
            traversal_order,
            global_domains,
            index,
        })
    }

    /// Parse and validate a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Yaml`] on a schema mismatch, or any invariant
    /// violation from [`RegionCatalog::new`].
    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(text)?;
        Self::new(file.regions, file.traversal_order, file.global_domains)
    }

    /// Read, parse, and validate a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, otherwise as
    /// [`RegionCatalog::from_yaml_str`].
    pub fn from_yaml_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Serialize back to the YAML schema accepted by [`Self::from_yaml_str`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Yaml`] if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            global_domains: self.global_domains.clone(),
            traversal_order: self.traversal_order.clone(),
            regions: self.regions.clone(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }

    /// Look up a region by code.
    pub fn get(&self, code: &RegionCode) -> Option<&Region> {
        self.index.get(code).map(|&i| &self.regions[i])
    }

    /// Look up a region from untrusted text (case-insensitive). Returns
    /// `None` for malformed or unknown codes.
    pub fn lookup(&self, raw: &str) -> Option<&Region> {
        RegionCode::new(raw).ok().and_then(|code| self.get(&code))
    }

    /// Whether the code names a catalog region.
    pub fn contains(&self, code: &RegionCode) -> bool {
        self.index.contains_key(code)
    }

    /// The fixed keyboard traversal order.
    pub fn traversal_order(&self) -> &[RegionCode] {
        &self.traversal_order
    }

    /// Position of a region in the traversal order.
    pub fn position(&self, code: &RegionCode) -> Option<usize> {
        self.traversal_order.iter().position(|c| c == code)
    }

    /// The region at a traversal position.
    pub fn at(&self, index: usize) -> Option<&Region> {
        self.traversal_order.get(index).and_then(|c| self.get(c))
    }

    /// Regions in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.traversal_order.iter().filter_map(|c| self.get(c))
    }

    /// Regions in declaration order. Domain resolution walks this order.
    pub fn declared(&self) -> &[Region] {
        &self.regions
    }

    /// Domains of the global entry point.
    pub fn global_domains(&self) -> &[String] {
        &self.global_domains
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Always false for a constructed catalog; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The catalog shipped with the portal.
    pub fn builtin() -> Self {
        let regions = builtin_regions();
        let traversal_order = ["za", "th", "gb", "pt"].into_iter().map(RegionCode::known).collect();
        let global_domains = vec![
            "healingbuds.com".to_string(),
            "www.healingbuds.com".to_string(),
            "healingbudsglobal.com".to_string(),
        ];
        let index = regions
            .iter()
            .enumerate()
            .map(|(i, r)| (r.code.clone(), i))
            .collect();
        Self {
            regions,
            traversal_order,
            global_domains,
            index,
        }
    }
}

fn check_domain(code: &RegionCode, domain: &str) -> Result<(), CatalogError> {
    let valid = !domain.is_empty()
        && domain == domain.trim()
        && domain == domain.to_ascii_lowercase()
        && !domain.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(CatalogError::InvalidDomain {
            code: code.clone(),
            domain: domain.to_string(),
        })
    }
}

fn check_external_url(code: &RegionCode, raw: &str) -> Result<(), CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidExternalUrl {
        code: code.clone(),
        url: raw.to_string(),
        reason,
    };
    let url = url::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

fn duplicate_domain(domain: &str, first: &RegionCode, second: &RegionCode) -> CatalogError {
    CatalogError::DuplicateDomain {
        domain: domain.to_string(),
        first: first.clone(),
        second: second.clone(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin_regions() -> Vec<Region> {
    vec![
        Region {
            code: RegionCode::known("za"),
            display_name: "South Africa".to_string(),
            flag: "🇿🇦".to_string(),
            coordinates: Coordinates { lat: -30.5595, lng: 22.9375 },
            status: RegionStatus::Live,
            status_description: "Operational".to_string(),
            external_url: Some("https://healingbuds.co.za".to_string()),
            eligibility_first: false,
            domains: strings(&["healingbuds.co.za", "www.healingbuds.co.za"]),
            regulatory_body: "SAHPRA".to_string(),
            compliance_certifications: strings(&[
                "EU GMP Products",
                "Seed-to-Sale Tracking",
                "Blockchain Traceability",
            ]),
            legal_note: "All products and services comply with SAHPRA (South African Health \
                         Products Regulatory Authority) regulations. A valid prescription is \
                         required for all medical cannabis products."
                .to_string(),
            language: "English".to_string(),
            currency: Currency {
                code: "ZAR".to_string(),
                symbol: "R".to_string(),
            },
            operations: Operations {
                kind: "Medical Clinic Network".to_string(),
                description: "Licensed medical cannabis consultations and prescription \
                              services through our South African clinic network."
                    .to_string(),
            },
            services: strings(&[
                "Online eligibility assessment",
                "Medical consultations",
                "Prescription fulfillment",
                "Patient support",
            ]),
            features: strings(&[
                "SAHPRA Compliant Operations",
                "EU GMP Certified Products",
                "Licensed South African Clinicians",
                "Blockchain Traceability",
            ]),
        },
        Region {
            code: RegionCode::known("gb"),
            display_name: "United Kingdom".to_string(),
            flag: "🇬🇧".to_string(),
            coordinates: Coordinates { lat: 55.3781, lng: -3.4360 },
            status: RegionStatus::Next,
            status_description: "Coming Soon".to_string(),
            external_url: None,
            eligibility_first: false,
            domains: strings(&["healingbuds.co.uk", "www.healingbuds.co.uk"]),
            regulatory_body: "CQC / MHRA".to_string(),
            compliance_certifications: strings(&[
                "CQC Registration (Planned)",
                "MHRA Compliance",
                "EU GMP Products",
            ]),
            legal_note: "UK services are currently in development. All future products and \
                         services will comply with UK regulations for medical cannabis as \
                         determined by the CQC and MHRA."
                .to_string(),
            language: "English".to_string(),
            currency: Currency {
                code: "GBP".to_string(),
                symbol: "£".to_string(),
            },
            operations: Operations {
                kind: "Private Clinic Network".to_string(),
                description: "Specialist medical cannabis consultations through our planned UK \
                              private clinic network, launching soon."
                    .to_string(),
            },
            services: strings(&[
                "Private specialist consultations",
                "Prescription services",
                "Patient care coordination",
                "Ongoing support",
            ]),
            features: strings(&[
                "CQC & MHRA Framework",
                "UK Registered Specialists",
                "Private Prescription Service",
                "Harley Street Network (Planned)",
            ]),
        },
        Region {
            code: RegionCode::known("pt"),
            display_name: "Portugal".to_string(),
            flag: "🇵🇹".to_string(),
            coordinates: Coordinates { lat: 39.3999, lng: -8.2245 },
            status: RegionStatus::Hq,
            status_description: "Global Headquarters".to_string(),
            external_url: None,
            eligibility_first: false,
            domains: strings(&["healingbuds.pt", "www.healingbuds.pt"]),
            regulatory_body: "INFARMED".to_string(),
            compliance_certifications: strings(&[
                "EU GMP Manufacturing",
                "Pharmaceutical License",
                "GACP Certification",
            ]),
            legal_note: "All operations are regulated by INFARMED (Autoridade Nacional do \
                         Medicamento e Produtos de Saúde). Healing Buds Portugal serves as the \
                         global cultivation and distribution headquarters."
                .to_string(),
            language: "Portuguese".to_string(),
            currency: Currency {
                code: "EUR".to_string(),
                symbol: "€".to_string(),
            },
            operations: Operations {
                kind: "Cultivation & Research Hub".to_string(),
                description: "EU GMP certified cultivation facility spanning over 18,000m² with \
                              pharmaceutical-grade processing and global distribution \
                              capabilities."
                    .to_string(),
            },
            services: strings(&[
                "EU GMP cultivation",
                "Pharmaceutical processing",
                "Global distribution",
                "Research partnerships",
            ]),
            features: strings(&[
                "EU GMP Certified Headquarters",
                "18,000m² Cultivation Facility",
                "Research with Imperial College London",
                "Global Distribution Network",
            ]),
        },
        Region {
            code: RegionCode::known("th"),
            display_name: "Thailand".to_string(),
            flag: "🇹🇭".to_string(),
            coordinates: Coordinates { lat: 15.8700, lng: 100.9925 },
            status: RegionStatus::Production,
            status_description: "Manufacturing Operations".to_string(),
            external_url: None,
            eligibility_first: false,
            domains: strings(&["healingbuds.co.th", "www.healingbuds.co.th", "healingbuds.th"]),
            regulatory_body: "Thai FDA".to_string(),
            compliance_certifications: strings(&[
                "Thai FDA Approved",
                "EU GMP Standards",
                "Traditional Medicine License",
            ]),
            legal_note: "All products and services are approved by the Thai Food and Drug \
                         Administration (FDA). Medical cannabis is legal in Thailand for \
                         approved therapeutic uses."
                .to_string(),
            language: "Thai / English".to_string(),
            currency: Currency {
                code: "THB".to_string(),
                symbol: "฿".to_string(),
            },
            operations: Operations {
                kind: "Production & Clinic Network".to_string(),
                description: "Thai FDA approved manufacturing facility with integrated clinic \
                              operations, combining traditional medicine with modern cannabis \
                              therapeutics."
                    .to_string(),
            },
            services: strings(&[
                "Manufacturing operations",
                "Medical consultations",
                "Traditional medicine integration",
                "Regional distribution",
            ]),
            features: strings(&[
                "Thai FDA Approved Operations",
                "Manufacturing Facility",
                "Bilingual Medical Staff",
                "Traditional Medicine Integration",
            ]),
        },
    ]
}
