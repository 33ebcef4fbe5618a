use crate::{
    aggregate::LatenessBins,
    error::{InsightError, InsightResult},
    types::ReviewScore,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ── Complaint keyword table ───────────────────────────────────────

/// One complaint bucket and the keyword stems that vote for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryKeywords {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryKeywords {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Classifier configuration.
///
/// `categories` is a list, not a map: declaration order breaks scoring ties,
/// so it has to survive a round trip through JSON unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    pub categories: Vec<CategoryKeywords>,
    pub fallback_label: String,
    /// Reviews scoring at or below this are the negative subset.
    #[serde(default = "default_negative_threshold")]
    pub negative_score_threshold: ReviewScore,
}

fn default_negative_threshold() -> ReviewScore {
    2
}

impl ClassifierConfig {
    /// English-labelled table used by the product-quality dashboard.
    pub fn reference() -> Self {
        Self {
            categories: vec![
                CategoryKeywords::new(
                    "Late Delivery",
                    &["atras", "demor", "prazo", "lento", "extravia", "nao chegou"],
                ),
                CategoryKeywords::new(
                    "Product Not Received",
                    &["nao recebi", "nao entregue", "nunca chegou", "consta entregue", "caixa vazia"],
                ),
                CategoryKeywords::new(
                    "Bad Product Quality / Defective",
                    &[
                        "quebra", "defeit", "nao funciona", "estraga", "avaria", "falso",
                        "acabamento", "desfiando", "queimou", "rasgado",
                    ],
                ),
                CategoryKeywords::new(
                    "Wrong Item Sent",
                    &["diferente", "errado", "outro", "modelo", "cor", "trocado", "versão", "estampa"],
                ),
                CategoryKeywords::new(
                    "Missing Items / Partial Delivery",
                    &[
                        "falta", "incompleto", "apenas", "só", "parte", "unidade", "kit", "parcial",
                        "quantidade",
                    ],
                ),
                CategoryKeywords::new(
                    "Return & Refund Issues",
                    &["devolv", "troca", "dinheiro", "volta", "cancel", "reembolso", "estorno"],
                ),
                CategoryKeywords::new(
                    "Poor Customer Service",
                    &[
                        "vendedor", "loja", "atendimento", "contato", "resposta", "ninguem",
                        "retorno", "pós venda", "soluçao",
                    ],
                ),
                CategoryKeywords::new(
                    "Problems with Carrier / Shipping",
                    &["correio", "frete", "transport", "carteiro", "entrega"],
                ),
            ],
            fallback_label: "Other".into(),
            negative_score_threshold: 2,
        }
    }

    /// Indonesian-language executive dashboard table. Lists accented and
    /// unaccented spellings side by side since matching never normalizes.
    pub fn regional() -> Self {
        Self {
            categories: vec![
                CategoryKeywords::new(
                    "Late Delivery",
                    &["atras", "demor", "prazo", "lento", "extravia", "nao chegou"],
                ),
                CategoryKeywords::new(
                    "Product Not Received",
                    &[
                        "não recebi", "nao recebi", "não entregue", "nao entregue", "nunca chegou",
                        "consta entregue", "caixa vazia",
                    ],
                ),
                CategoryKeywords::new(
                    "Missing Items / Partial Delivery",
                    &[
                        "falt", "incompleto", "apenas", "só", "parte", "unidade", "kit", "parcial",
                        "quantitade", "somen",
                    ],
                ),
                CategoryKeywords::new(
                    "Bad Product Quality / Defective",
                    &[
                        "quebra", "defeit", "qualidade ruim", "funciona", "estraga", "avaria",
                        "falso", "caixa", "rasga", "mancha", "costura", "acabamento", "arranha",
                        "amassad", "solto", "velh",
                    ],
                ),
                CategoryKeywords::new(
                    "Wrong Item Sent",
                    &["diferente", "erra", "outro", "modelo", "cor ", "trocado", "marca", "tamanho"],
                ),
                CategoryKeywords::new(
                    "Bad Packaging",
                    &[
                        "caixa", "embala", "rasgad", "abert", "violad", "frágil", "fragil",
                        "danificad", "pacote",
                    ],
                ),
                CategoryKeywords::new(
                    "Bad Service / Seller Issues",
                    &[
                        "atendimento", "sem resposta", "ninguem responde", "não resolve",
                        "pós venda", "mau vendedor", "sem retorno", "diálogo", "serviço", "servico",
                    ],
                ),
            ],
            fallback_label: "Lainnya".into(),
            negative_score_threshold: 2,
        }
    }

    /// Reference table with the wider `<= 3` negative threshold used during
    /// topic exploration.
    pub fn exploratory() -> Self {
        Self {
            negative_score_threshold: 3,
            ..Self::reference()
        }
    }

    /// Reject tables that indicate a broken deployment.
    pub fn validate(&self) -> InsightResult<()> {
        if self.categories.is_empty() {
            return Err(InsightError::EmptyCategoryTable);
        }
        if !(1..=5).contains(&self.negative_score_threshold) {
            return Err(InsightError::InvalidThreshold(self.negative_score_threshold));
        }
        if self.fallback_label.trim().is_empty() {
            return Err(InsightError::InvalidFallback {
                label: self.fallback_label.clone(),
                reason: "label is blank".into(),
            });
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.name.as_str()) {
                return Err(InsightError::DuplicateCategory {
                    name: category.name.clone(),
                });
            }
            if category.keywords.is_empty() {
                return Err(InsightError::EmptyKeywordList {
                    name: category.name.clone(),
                });
            }
            // An empty needle is a substring of every comment.
            if category.keywords.iter().any(|k| k.is_empty()) {
                return Err(InsightError::BlankKeyword {
                    name: category.name.clone(),
                });
            }
            // Comments are lowercased before matching; keywords are not.
            if let Some(k) = category.keywords.iter().find(|k| k.to_lowercase() != **k) {
                return Err(InsightError::UppercaseKeyword {
                    name: category.name.clone(),
                    keyword: k.clone(),
                });
            }
        }
        if seen.contains(self.fallback_label.as_str()) {
            return Err(InsightError::InvalidFallback {
                label: self.fallback_label.clone(),
                reason: "label collides with a configured category".into(),
            });
        }
        Ok(())
    }
}

// ── Fulfillment ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FulfillmentConfig {
    /// Only orders in this status take part in lateness derivation.
    pub delivered_status: String,
    /// Lower edges of the customer-lateness histogram, in days.
    pub customer_bin_edges: Vec<f64>,
    /// Lower edges of the seller-dispatch-lateness histogram, in days.
    pub dispatch_bin_edges: Vec<f64>,
    pub top_late_categories: usize,
}

impl FulfillmentConfig {
    pub fn customer_bins(&self) -> InsightResult<LatenessBins> {
        LatenessBins::new(self.customer_bin_edges.clone())
    }

    pub fn dispatch_bins(&self) -> InsightResult<LatenessBins> {
        LatenessBins::new(self.dispatch_bin_edges.clone())
    }
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            delivered_status: "delivered".into(),
            // [0,5) .. [55,60) then 60+
            customer_bin_edges: (0..=12).map(|i| f64::from(i * 5)).collect(),
            // [0,5) .. [15,20) then 20+
            dispatch_bin_edges: (0..=4).map(|i| f64::from(i * 5)).collect(),
            top_late_categories: 5,
        }
    }
}

// ── Reviews ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewQualityConfig {
    /// Categories with fewer reviews are left out of the rankings.
    pub min_reviews: usize,
    pub top_n: usize,
}

impl Default for ReviewQualityConfig {
    fn default() -> Self {
        Self {
            min_reviews: 50,
            top_n: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplingConfig {
    pub sample_size: usize,
    pub seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_size: 30,
            seed: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ReviewsFile {
    quality: ReviewQualityConfig,
    unclassified_sample: SamplingConfig,
}

// ── Revenue ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueConfig {
    pub top_categories: usize,
}

impl Default for RevenueConfig {
    fn default() -> Self {
        Self { top_categories: 10 }
    }
}

// ── Top-level ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InsightConfig {
    pub classifier: ClassifierConfig,
    pub fulfillment: FulfillmentConfig,
    pub review_quality: ReviewQualityConfig,
    pub sampling: SamplingConfig,
    pub revenue: RevenueConfig,
}

impl InsightConfig {
    /// Load from the data/ directory.
    /// In tests, use InsightConfig::default_test().
    pub fn load(data_dir: &str) -> InsightResult<Self> {
        let classifier: ClassifierConfig =
            read_json(&format!("{data_dir}/complaints/complaint_keywords.json"))?;
        let fulfillment: FulfillmentConfig =
            read_json(&format!("{data_dir}/fulfillment/fulfillment_config.json"))?;
        let reviews: ReviewsFile = read_json(&format!("{data_dir}/reviews/review_quality.json"))?;
        let revenue: RevenueConfig =
            read_json(&format!("{data_dir}/revenue/revenue_config.json"))?;

        let config = Self {
            classifier,
            fulfillment,
            review_quality: reviews.quality,
            sampling: reviews.unclassified_sample,
            revenue,
        };
        config.validate()?;
        log::info!(
            "loaded config from {data_dir}: {} complaint categories, fallback '{}', threshold <= {}",
            config.classifier.categories.len(),
            config.classifier.fallback_label,
            config.classifier.negative_score_threshold,
        );
        Ok(config)
    }

    /// Built-in tables with default reporting knobs.
    pub fn with_classifier(classifier: ClassifierConfig) -> Self {
        Self {
            classifier,
            fulfillment: FulfillmentConfig::default(),
            review_quality: ReviewQualityConfig::default(),
            sampling: SamplingConfig::default(),
            revenue: RevenueConfig::default(),
        }
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            review_quality: ReviewQualityConfig {
                min_reviews: 1,
                top_n: 3,
            },
            sampling: SamplingConfig {
                sample_size: 5,
                seed: 7,
            },
            ..Self::with_classifier(ClassifierConfig::reference())
        }
    }

    pub fn validate(&self) -> InsightResult<()> {
        self.classifier.validate()?;
        self.fulfillment.customer_bins()?;
        self.fulfillment.dispatch_bins()?;
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> InsightResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| InsightError::ConfigRead {
        path: path.to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
