use crate::classifier::{Classifier, LogisticModel};
use crate::config::Config;
use crate::features::{FeatureAnalysis, FeatureEngine};
use crate::verdict::{Assessment, Verdict, VerdictPolicy};
use std::sync::Arc;

/// Assessment plus the features behind it, when extraction ran
#[derive(Debug, Clone)]
pub struct Inspection {
    pub assessment: Assessment,
    pub analysis: Option<FeatureAnalysis>,
}

impl Inspection {
    fn terminal(verdict: Verdict) -> Self {
        Self {
            assessment: Assessment::unscored(verdict),
            analysis: None,
        }
    }
}

/// Scores URLs end to end: validation, feature extraction, classifier,
/// verdict policy. Safe to share between concurrent requests.
pub struct Detector {
    engine: Arc<FeatureEngine>,
    classifier: Option<Arc<dyn Classifier>>,
    policy: VerdictPolicy,
}

impl Detector {
    pub fn new(
        engine: FeatureEngine,
        classifier: Option<Arc<dyn Classifier>>,
        policy: VerdictPolicy,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            classifier,
            policy,
        }
    }

    /// Build the live engine and load the model named in the config. A model
    /// that fails to load is logged and leaves the detector without one.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let engine = FeatureEngine::from_config(config)?;
        let classifier = load_classifier(&config.model_path);
        Ok(Self::new(
            engine,
            classifier,
            VerdictPolicy::from_config(&config.verdict),
        ))
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub async fn assess(&self, url: &str) -> Assessment {
        self.inspect(url).await.assessment
    }

    pub async fn inspect(&self, url: &str) -> Inspection {
        let url = url.trim();
        if url.is_empty() {
            return Inspection::terminal(Verdict::Invalid);
        }

        let Some(classifier) = self.classifier.clone() else {
            log::warn!("No classifier loaded, not scoring {url}");
            return Inspection::terminal(Verdict::ModelUnavailable);
        };

        // Own task: a panic in extraction or the model comes back as a JoinError
        let engine = Arc::clone(&self.engine);
        let owned_url = url.to_string();
        let task = tokio::spawn(async move {
            let analysis = engine.analyze(&owned_url).await;
            let probability = classifier.predict_proba(&analysis.vector.to_f64())?;
            Ok::<_, anyhow::Error>((analysis, probability))
        });

        let scored = match task.await {
            Ok(Ok(scored)) => scored,
            Ok(Err(e)) => {
                log::warn!("Prediction error for {url}: {e:#}");
                return Inspection::terminal(Verdict::ExtractionError);
            }
            Err(e) => {
                log::warn!("Feature extraction aborted for {url}: {e}");
                return Inspection::terminal(Verdict::ExtractionError);
            }
        };

        let (analysis, probability) = scored;
        match self.policy.decide(url, probability) {
            Ok(assessment) => {
                log::info!(
                    "{url}: {} ({:.2}%)",
                    assessment.verdict,
                    assessment.probability
                );
                Inspection {
                    assessment,
                    analysis: Some(analysis),
                }
            }
            Err(e) => {
                log::warn!("Prediction error for {url}: {e:#}");
                Inspection {
                    assessment: Assessment::unscored(Verdict::ExtractionError),
                    analysis: Some(analysis),
                }
            }
        }
    }
}

pub fn load_classifier(path: &str) -> Option<Arc<dyn Classifier>> {
    match LogisticModel::from_file(path) {
        Ok(model) => {
            log::info!("Model '{}' loaded from {path}", model.name);
            Some(Arc::new(model))
        }
        Err(e) => {
            log::error!("Error loading model: {e:#}");
            None
        }
    }
}
