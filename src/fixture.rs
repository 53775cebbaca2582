//! Fixtures for tests
use crate::aggregate::LabourCounts;
use crate::boq::{MaterialEntry, ParsedBoq, ResolvedMaterial};
use crate::learned::{
    LearnedModels, LinearMultiLabelClassifier, LinearRegressor, ModelCache, TfidfVectorizer,
};
use crate::predictor::Predictor;
use crate::rules::{RuleOutcome, RuleTable};
use map_macro::hash_map;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// A resolved material whose text is its name
pub fn material(name: &str, quantity: Option<f64>, unit: Option<&str>) -> ResolvedMaterial {
    ResolvedMaterial {
        name: Some(name.to_string()),
        quantity,
        unit: unit.map(str::to_string),
        text: name.to_string(),
    }
}

/// A BOQ made of raw material strings
pub fn boq(materials: &[&str]) -> ParsedBoq {
    ParsedBoq {
        materials: materials.iter().map(|m| MaterialEntry::from(*m)).collect(),
        raw_text: materials.join("\n"),
        ..Default::default()
    }
}

#[fixture]
pub fn rule_table() -> RuleTable {
    RuleTable::from_rules([
        (
            "cement",
            RuleOutcome {
                machinery: vec!["Concrete Mixer".into()],
                vehicles: vec!["Bulk Cement Truck".into()],
                labour: LabourCounts::new(1, 2),
            },
        ),
        (
            "grout",
            RuleOutcome {
                machinery: vec!["Grout Pump".into()],
                vehicles: Vec::new(),
                labour: LabourCounts::new(1, 0),
            },
        ),
    ])
}

#[fixture]
pub fn predictor(rule_table: RuleTable) -> Predictor {
    Predictor::new(rule_table, ModelCache::disabled())
}

#[fixture]
pub fn tfidf_vectorizer() -> TfidfVectorizer {
    TfidfVectorizer {
        vocabulary: hash_map! {
            "concrete".to_string() => 0,
            "sand".to_string() => 1,
            "ready mix".to_string() => 2,
        },
        idf: vec![1.0, 1.0, 1.0],
        ngram_max: 2,
        sublinear_tf: false,
    }
}

#[fixture]
pub fn learned_models(tfidf_vectorizer: TfidfVectorizer) -> LearnedModels {
    let machinery = LinearMultiLabelClassifier {
        labels: vec!["Concrete Pump".into(), "Loader".into()],
        coefficients: vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
        intercepts: vec![0.0, 0.0],
        threshold: 0.5,
    };
    let labour = LinearRegressor {
        coefficients: [vec![2.83, 0.0, 0.0], vec![0.0, 0.0, 7.07]],
        intercepts: [1.0, 0.0],
    };
    let roles = LinearMultiLabelClassifier {
        labels: vec!["pump_operator".into(), "labourer".into()],
        ..machinery.clone()
    };

    LearnedModels::new(
        Box::new(tfidf_vectorizer),
        Box::new(machinery),
        Some(Box::new(labour)),
        Some(Box::new(roles)),
    )
}

/// Learned models whose machinery classifier is narrower than the vectoriser's output
#[fixture]
pub fn broken_machinery_models(tfidf_vectorizer: TfidfVectorizer) -> LearnedModels {
    let machinery = LinearMultiLabelClassifier {
        labels: vec!["Concrete Pump".into()],
        coefficients: vec![vec![1.0, 0.0]],
        intercepts: vec![0.0],
        threshold: 0.5,
    };
    let labour = LinearRegressor {
        coefficients: [vec![2.83, 0.0, 0.0], vec![0.0, 0.0, 7.07]],
        intercepts: [1.0, 0.0],
    };
    let roles = LinearMultiLabelClassifier {
        labels: vec!["pump_operator".into()],
        coefficients: vec![vec![1.0, 0.0, 0.0]],
        intercepts: vec![0.0],
        threshold: 0.5,
    };

    LearnedModels::new(
        Box::new(tfidf_vectorizer),
        Box::new(machinery),
        Some(Box::new(labour)),
        Some(Box::new(roles)),
    )
}
