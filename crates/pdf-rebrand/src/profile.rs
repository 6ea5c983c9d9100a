//! Company identity values and field resolution
//!
//! Blocks name the value they draw through a closed set of field
//! identifiers. Each identifier resolves to a typed optional value; an
//! absent value means the block is not drawn.

use crate::options::FieldLabels;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Text-valued profile fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TextField {
    CompanyName,
    Address,
    Phone,
    Fax,
    Email,
    ContactPerson,
    LicenseNumber,
    FeeRatioLandlord,
    FeeRatioTenant,
    FeeDistributionLandlord,
    FeeDistributionTenant,
}

impl TextField {
    pub fn is_fee(self) -> bool {
        matches!(
            self,
            TextField::FeeRatioLandlord
                | TextField::FeeRatioTenant
                | TextField::FeeDistributionLandlord
                | TextField::FeeDistributionTenant
        )
    }
}

/// Image-valued profile fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ImageField {
    Logo,
    LineQr,
}

/// An image referenced by key (URL or path) with its fetched bytes.
///
/// `data` is `None` when the fetch failed; such blocks are skipped with a
/// warning instead of failing the export.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageRef {
    pub key: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Option<Vec<u8>>,
}

impl ImageRef {
    pub fn new(key: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            data: Some(data),
        }
    }

    /// A reference whose bytes could not be fetched
    pub fn missing(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            data: None,
        }
    }
}

/// A resolved field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Percentage(f64),
}

/// What an image block can draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageResolution<'a> {
    /// The profile has no image for the field
    Absent,
    /// The image is referenced but its bytes could not be fetched
    Missing { key: &'a str },
    Ready { key: &'a str, data: &'a [u8] },
}

/// Company identity values resolved for one export
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolvedProfile {
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub contact_person: Option<String>,
    pub license_number: Option<String>,
    pub logo: Option<ImageRef>,
    pub line_qr: Option<ImageRef>,
    pub fee_ratio_landlord: Option<f64>,
    pub fee_ratio_tenant: Option<f64>,
    pub fee_distribution_landlord: Option<f64>,
    pub fee_distribution_tenant: Option<f64>,
}

impl ResolvedProfile {
    /// Typed value behind a text field, if any
    pub fn value(&self, field: TextField) -> Option<FieldValue<'_>> {
        fn text(v: &Option<String>) -> Option<FieldValue<'_>> {
            v.as_deref().map(FieldValue::Text)
        }
        let pct = |v: Option<f64>| v.filter(|p| p.is_finite()).map(FieldValue::Percentage);
        match field {
            TextField::CompanyName => text(&self.company_name),
            TextField::Address => text(&self.address),
            TextField::Phone => text(&self.phone),
            TextField::Fax => text(&self.fax),
            TextField::Email => text(&self.email),
            TextField::ContactPerson => text(&self.contact_person),
            TextField::LicenseNumber => text(&self.license_number),
            TextField::FeeRatioLandlord => pct(self.fee_ratio_landlord),
            TextField::FeeRatioTenant => pct(self.fee_ratio_tenant),
            TextField::FeeDistributionLandlord => pct(self.fee_distribution_landlord),
            TextField::FeeDistributionTenant => pct(self.fee_distribution_tenant),
        }
    }

    /// The string a text block draws: the raw value, or
    /// `"<label>: <value>%"` for fee fields. Blank values resolve to `None`.
    pub fn resolve_text(&self, field: TextField, labels: &FieldLabels) -> Option<String> {
        match self.value(field)? {
            FieldValue::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            FieldValue::Percentage(value) => {
                let label = match field {
                    TextField::FeeRatioLandlord => &labels.fee_ratio_landlord,
                    TextField::FeeRatioTenant => &labels.fee_ratio_tenant,
                    TextField::FeeDistributionLandlord => &labels.fee_distribution_landlord,
                    _ => &labels.fee_distribution_tenant,
                };
                Some(format!("{}: {}%", label, value))
            }
        }
    }

    pub fn resolve_image(&self, field: ImageField) -> ImageResolution<'_> {
        match self.image(field) {
            None => ImageResolution::Absent,
            Some(ImageRef { key, data: None }) => ImageResolution::Missing { key },
            Some(ImageRef {
                key,
                data: Some(data),
            }) => ImageResolution::Ready { key, data },
        }
    }

    pub fn image(&self, field: ImageField) -> Option<&ImageRef> {
        match field {
            ImageField::Logo => self.logo.as_ref(),
            ImageField::LineQr => self.line_qr.as_ref(),
        }
    }

    pub fn image_mut(&mut self, field: ImageField) -> Option<&mut ImageRef> {
        match field {
            ImageField::Logo => self.logo.as_mut(),
            ImageField::LineQr => self.line_qr.as_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_formatting() {
        let profile = ResolvedProfile {
            fee_ratio_landlord: Some(50.0),
            fee_distribution_tenant: Some(2.5),
            ..Default::default()
        };
        let labels = FieldLabels::default();
        assert_eq!(
            profile.resolve_text(TextField::FeeRatioLandlord, &labels).as_deref(),
            Some("Fee (landlord): 50%")
        );
        assert_eq!(
            profile.resolve_text(TextField::FeeDistributionTenant, &labels).as_deref(),
            Some("Share (tenant): 2.5%")
        );
        assert_eq!(profile.resolve_text(TextField::FeeRatioTenant, &labels), None);
    }

    #[test]
    fn test_blank_text_suppressed() {
        let profile = ResolvedProfile {
            company_name: Some("   ".to_string()),
            phone: Some(" 03-1234-5678 ".to_string()),
            ..Default::default()
        };
        let labels = FieldLabels::default();
        assert_eq!(profile.resolve_text(TextField::CompanyName, &labels), None);
        assert_eq!(
            profile.resolve_text(TextField::Phone, &labels).as_deref(),
            Some("03-1234-5678")
        );
    }

    #[test]
    fn test_image_lookup() {
        let profile = ResolvedProfile {
            logo: Some(ImageRef::missing("logo.png")),
            ..Default::default()
        };
        assert_eq!(profile.image(ImageField::Logo).map(|i| i.key.as_str()), Some("logo.png"));
        assert!(profile.image(ImageField::LineQr).is_none());
        assert_eq!(
            profile.resolve_image(ImageField::Logo),
            ImageResolution::Missing { key: "logo.png" }
        );
        assert_eq!(profile.resolve_image(ImageField::LineQr), ImageResolution::Absent);
    }
}
