//! Optional learned models which refine rule-based predictions.
//!
//! Models are trained offline and exported as JSON artifacts to a single directory:
//!
//! * `vectorizer.json`: TF-IDF text vectoriser (required)
//! * `classifier.json`: multi-label machinery classifier (required)
//! * `regressor_labour.json`: skilled/unskilled headcount regressor (optional)
//! * `classifier_roles.json`: multi-label labour role classifier (optional)
//!
//! If either required artifact is unavailable the learned path is disabled and predictions fall
//! back to rules and heuristics.
use crate::aggregate::LabourCounts;
use crate::input::read_json;
use anyhow::{Context, Result, ensure};
use log::{info, warn};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// File name of the text vectoriser artifact
pub const VECTORIZER_FILE: &str = "vectorizer.json";
/// File name of the machinery classifier artifact
pub const MACHINERY_CLASSIFIER_FILE: &str = "classifier.json";
/// File name of the labour regressor artifact
pub const LABOUR_REGRESSOR_FILE: &str = "regressor_labour.json";
/// File name of the labour role classifier artifact
pub const ROLE_CLASSIFIER_FILE: &str = "classifier_roles.json";

/// A dense numeric representation of some text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Create a feature vector from raw values
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no features
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The feature values
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Dot product with a weight vector of the same width
    fn dot(&self, weights: &[f64]) -> Result<f64> {
        ensure!(
            weights.len() == self.len(),
            "Weight vector has {} entries but there are {} features",
            weights.len(),
            self.len()
        );
        Ok(self.0.iter().zip(weights).map(|(x, w)| x * w).sum())
    }
}

/// Converts text into features
pub trait TextVectorizer: Debug + Send + Sync {
    /// Vectorise a set of texts, treated as a single document
    fn transform(&self, texts: &[String]) -> Result<FeatureVector>;
}

/// Predicts a set of labels from features
pub trait MultiLabelClassifier: Debug + Send + Sync {
    /// The labels which apply to the features
    fn predict_labels(&self, features: &FeatureVector) -> Result<BTreeSet<String>>;
}

/// Predicts a pair of values from features
pub trait MultiOutputRegressor: Debug + Send + Sync {
    /// The predicted outputs
    fn predict(&self, features: &FeatureVector) -> Result<(f64, f64)>;
}

/// A TF-IDF vectoriser over word n-grams
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TfidfVectorizer {
    /// Maps each known n-gram to its feature index
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency for each feature
    pub idf: Vec<f64>,
    /// Longest n-gram to consider
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,
    /// Whether to use `1 + ln(tf)` in place of raw term frequency
    #[serde(default)]
    pub sublinear_tf: bool,
}

fn default_ngram_max() -> usize {
    1
}

impl TfidfVectorizer {
    fn ngrams(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .collect();

        (1..=self.ngram_max.max(1))
            .flat_map(|n| tokens.windows(n).map(|window| window.join(" ")))
            .collect()
    }
}

impl TextVectorizer for TfidfVectorizer {
    fn transform(&self, texts: &[String]) -> Result<FeatureVector> {
        let width = self.idf.len();
        let mut features = vec![0.0_f64; width];
        for gram in self.ngrams(&texts.join(" ")) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                ensure!(
                    index < width,
                    "Vocabulary index {index} for '{gram}' exceeds {width} features"
                );
                features[index] += 1.0;
            }
        }

        for (value, idf) in features.iter_mut().zip(&self.idf) {
            if *value > 0.0 {
                let tf = if self.sublinear_tf {
                    1.0 + value.ln()
                } else {
                    *value
                };
                *value = tf * idf;
            }
        }

        let norm = features.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut features {
                *value /= norm;
            }
        }

        Ok(FeatureVector(features))
    }
}

/// One-vs-rest linear classifier
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearMultiLabelClassifier {
    /// Label names, one per row of coefficients
    pub labels: Vec<String>,
    /// Weight rows, one per label
    pub coefficients: Vec<Vec<f64>>,
    /// Bias terms, one per label
    pub intercepts: Vec<f64>,
    /// Decision threshold: a label applies when its score exceeds this value
    #[serde(default)]
    pub threshold: f64,
}

impl MultiLabelClassifier for LinearMultiLabelClassifier {
    fn predict_labels(&self, features: &FeatureVector) -> Result<BTreeSet<String>> {
        ensure!(
            self.labels.len() == self.coefficients.len()
                && self.labels.len() == self.intercepts.len(),
            "Classifier has {} labels, {} coefficient rows and {} intercepts",
            self.labels.len(),
            self.coefficients.len(),
            self.intercepts.len()
        );

        let mut selected = BTreeSet::new();
        for ((label, weights), intercept) in
            self.labels.iter().zip(&self.coefficients).zip(&self.intercepts)
        {
            let score = features
                .dot(weights)
                .with_context(|| format!("Cannot score label '{label}'"))?
                + intercept;
            if score > self.threshold {
                selected.insert(label.clone());
            }
        }

        Ok(selected)
    }
}

/// Linear regressor with two outputs
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearRegressor {
    /// Weight rows, one per output
    pub coefficients: [Vec<f64>; 2],
    /// Bias terms, one per output
    pub intercepts: [f64; 2],
}

impl MultiOutputRegressor for LinearRegressor {
    fn predict(&self, features: &FeatureVector) -> Result<(f64, f64)> {
        let first = features.dot(&self.coefficients[0])? + self.intercepts[0];
        let second = features.dot(&self.coefficients[1])? + self.intercepts[1];
        ensure!(
            first.is_finite() && second.is_finite(),
            "Regressor produced non-finite output ({first}, {second})"
        );
        Ok((first, second))
    }
}

/// What the learned models suggest for a BOQ.
///
/// Each field is `None` if that model is absent or failed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LearnedPrediction {
    /// Machinery to add
    pub machinery: Option<BTreeSet<String>>,
    /// Minimum labour
    pub labour: Option<LabourCounts>,
    /// Labour roles to add
    pub roles: Option<BTreeSet<String>>,
}

/// The full set of learned models
#[derive(Debug)]
pub struct LearnedModels {
    vectorizer: Box<dyn TextVectorizer>,
    machinery: Box<dyn MultiLabelClassifier>,
    labour: Option<Box<dyn MultiOutputRegressor>>,
    roles: Option<Box<dyn MultiLabelClassifier>>,
}

impl LearnedModels {
    /// Assemble models from their components
    pub fn new(
        vectorizer: Box<dyn TextVectorizer>,
        machinery: Box<dyn MultiLabelClassifier>,
        labour: Option<Box<dyn MultiOutputRegressor>>,
        roles: Option<Box<dyn MultiLabelClassifier>>,
    ) -> Self {
        Self {
            vectorizer,
            machinery,
            labour,
            roles,
        }
    }

    /// Load model artifacts from a directory.
    ///
    /// Fails if the vectoriser or machinery classifier can't be read. The labour regressor and role
    /// classifier are skipped (with a warning) if unavailable.
    pub fn load(models_dir: &Path) -> Result<Self> {
        let vectorizer: TfidfVectorizer = read_json(&models_dir.join(VECTORIZER_FILE))?;
        let machinery: LinearMultiLabelClassifier =
            read_json(&models_dir.join(MACHINERY_CLASSIFIER_FILE))?;
        let labour =
            load_optional::<LinearRegressor>(models_dir, LABOUR_REGRESSOR_FILE, "Labour regressor");
        let roles = load_optional::<LinearMultiLabelClassifier>(
            models_dir,
            ROLE_CLASSIFIER_FILE,
            "Labour roles classifier",
        );

        Ok(Self::new(
            Box::new(vectorizer),
            Box::new(machinery),
            labour.map(|model| Box::new(model) as Box<dyn MultiOutputRegressor>),
            roles.map(|model| Box::new(model) as Box<dyn MultiLabelClassifier>),
        ))
    }

    /// Whether a labour regressor is available
    pub fn has_labour_regressor(&self) -> bool {
        self.labour.is_some()
    }

    /// Whether a labour role classifier is available
    pub fn has_role_classifier(&self) -> bool {
        self.roles.is_some()
    }

    /// Run the models over the texts of a BOQ's material lines.
    ///
    /// Returns an error only if the texts can't be vectorised. Failures in the individual models
    /// are logged and leave the corresponding field empty.
    pub fn predict(&self, texts: &[String]) -> Result<LearnedPrediction> {
        let features = self
            .vectorizer
            .transform(texts)
            .context("Failed to vectorise material text")?;

        let machinery = self
            .machinery
            .predict_labels(&features)
            .inspect_err(|err| warn!("Machinery classifier failed: {err:?}"))
            .ok();

        let labour = self.labour.as_ref().and_then(|model| {
            model
                .predict(&features)
                .map(|(skilled, unskilled)| {
                    LabourCounts::new(to_headcount(skilled), to_headcount(unskilled))
                })
                .inspect_err(|err| warn!("Labour regressor failed: {err:?}"))
                .ok()
        });

        let roles = self.roles.as_ref().and_then(|model| {
            model
                .predict_labels(&features)
                .inspect_err(|err| warn!("Labour roles classifier failed: {err:?}"))
                .ok()
        });

        Ok(LearnedPrediction {
            machinery,
            labour,
            roles,
        })
    }
}

/// Round a predicted headcount (halves to even), clamping negative values to zero
fn to_headcount(value: f64) -> u32 {
    value.round_ties_even().max(0.0) as u32
}

fn load_optional<T: serde::de::DeserializeOwned>(
    models_dir: &Path,
    file_name: &str,
    description: &str,
) -> Option<T> {
    let file_path = models_dir.join(file_name);
    if !file_path.is_file() {
        warn!("{description} not found at {}", file_path.display());
        return None;
    }

    read_json(&file_path)
        .inspect_err(|err| warn!("{description} could not be loaded: {err:?}"))
        .ok()
}

/// Lazily loaded learned models, shared between predictions.
///
/// The artifacts are loaded at most once, on first use. Loading failures are logged and disable
/// the learned path for the lifetime of the cache.
#[derive(Debug, Default)]
pub struct ModelCache {
    models_dir: Option<PathBuf>,
    models: OnceLock<Option<LearnedModels>>,
}

impl ModelCache {
    /// A cache which loads models from the given directory on first use
    pub fn lazy(models_dir: PathBuf) -> Self {
        Self {
            models_dir: Some(models_dir),
            models: OnceLock::new(),
        }
    }

    /// A cache holding models which have already been loaded
    pub fn preloaded(models: LearnedModels) -> Self {
        Self {
            models_dir: None,
            models: OnceLock::from(Some(models)),
        }
    }

    /// A cache with no models
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Get the models, loading them if this is the first call
    pub fn get(&self) -> Option<&LearnedModels> {
        self.models
            .get_or_init(|| {
                let models_dir = self.models_dir.as_deref()?;
                match LearnedModels::load(models_dir) {
                    Ok(models) => {
                        info!("Loaded learned models from {}", models_dir.display());
                        Some(models)
                    }
                    Err(err) => {
                        warn!("Learned models not available; using rule-based predictions: {err:?}");
                        None
                    }
                }
            })
            .as_ref()
    }
}
