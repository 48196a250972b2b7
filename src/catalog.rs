//! The fixed set of attribute columns recognised in SPAM tables.
//!
//! Column names are the cross product of a commodity code and a technology
//! suffix, e.g. `WHEA` + `_I` = `WHEA_I`.

use std::collections::HashSet;

use crate::error::ConfigError;

pub const SPAM_SUBJECTS: &[&str] = &[
    "WHEA", "RICE", "MAIZ", "BARL", "PMIL", "SMIL", "SORG", "OCER", "POTA", "SWPO", "YAMS", "CASS",
    "ORTS", "BEAN", "CHIC", "COWP", "PIGE", "LENT", "OPUL", "SOYB", "GROU", "CNUT", "OILP", "SUNF",
    "RAPE", "SESA", "OOIL", "SUGC", "SUGB", "COTT", "OFIB", "ACOF", "RCOF", "COCO", "TEAS", "TOBA",
    "BANA", "PLNT", "TROF", "TEMF", "VEGE", "REST", "VP_CROP", "VP_FOOD", "VP_NONF", "AREA_CR",
    "AREA_FO", "AREA_NF", "VP_CR_AR", "VP_FO_AR", "VP_NF_AR",
];

/// Technology suffixes and their labels.
pub const SPAM_VARIANTS: &[(&str, &str)] = &[
    ("_A", "all"),
    ("_I", "irrigated"),
    ("_H", "rainfed-high-input"),
    ("_L", "rainfed-low-input"),
    ("_S", "rainfed-subsistence"),
    ("_R", "rainfed"),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
    pub code: String,
    pub label: String,
}

impl Variant {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub subject: String,
    pub variant: Variant,
    name: String,
}

impl Attribute {
    fn new(subject: &str, variant: &Variant) -> Self {
        Self {
            subject: subject.to_string(),
            variant: variant.clone(),
            name: format!("{}{}", subject, variant.code),
        }
    }

    /// Column name as it appears in the input tables.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered, read-only set of candidate attributes. Built once per run and
/// shared between workers.
#[derive(Debug, Clone)]
pub struct Catalog {
    subjects: Vec<String>,
    variants: Vec<Variant>,
    attributes: Vec<Attribute>,
}

impl Catalog {
    pub fn new(subjects: Vec<String>, variants: Vec<Variant>) -> Result<Self, ConfigError> {
        if subjects.is_empty() {
            return Err(ConfigError::Empty("subject list"));
        }
        if variants.is_empty() {
            return Err(ConfigError::Empty("variant list"));
        }
        check_unique("subject", subjects.iter().map(String::as_str))?;
        check_unique("variant", variants.iter().map(|v| v.code.as_str()))?;

        let attributes = subjects
            .iter()
            .flat_map(|s| variants.iter().map(move |v| Attribute::new(s, v)))
            .collect();

        Ok(Self {
            subjects,
            variants,
            attributes,
        })
    }

    /// Full SPAM catalog: 51 subjects x 6 technologies.
    pub fn spam() -> Self {
        let subjects = SPAM_SUBJECTS.iter().map(|s| s.to_string()).collect();
        let variants = SPAM_VARIANTS
            .iter()
            .map(|(code, label)| Variant::new(*code, *label))
            .collect();
        // The built-in lists are non-empty and duplicate-free.
        Self::new(subjects, variants).unwrap_or_else(|e| unreachable!("{e}"))
    }

    /// Narrows the catalog to the given codes, keeping catalog order. An empty
    /// filter keeps every code of that kind.
    pub fn restrict(&self, subjects: &[String], variants: &[String]) -> Result<Self, ConfigError> {
        for code in subjects {
            if !self.subjects.contains(code) {
                return Err(ConfigError::UnknownCode {
                    kind: "subject",
                    code: code.clone(),
                });
            }
        }
        for code in variants {
            if !self.variants.iter().any(|v| &v.code == code) {
                return Err(ConfigError::UnknownCode {
                    kind: "variant",
                    code: code.clone(),
                });
            }
        }

        let kept_subjects = self
            .subjects
            .iter()
            .filter(|s| subjects.is_empty() || subjects.contains(s))
            .cloned()
            .collect();
        let kept_variants = self
            .variants
            .iter()
            .filter(|v| variants.is_empty() || variants.contains(&v.code))
            .cloned()
            .collect();
        Self::new(kept_subjects, kept_variants)
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::spam()
    }
}

fn check_unique<'a>(
    kind: &'static str,
    codes: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for code in codes {
        if !seen.insert(code) {
            return Err(ConfigError::DuplicateCode {
                kind,
                code: code.to_string(),
            });
        }
    }
    Ok(())
}
