use common::{MetricKind, MetricsCatalog, ModelRanking, RankedModel};
use std::cmp::Ordering;

/// Display label of a model identifier, e.g. `random_forest` -> `RANDOM FOREST`.
pub fn display_label(model: &str) -> String {
    model.replacen('_', " ", 1).to_uppercase()
}

/// Orders the catalog from lowest to highest error on `metric`.
///
/// The first model is flagged best and the last worst; equal scores keep
/// catalog order.
pub fn rank_models(catalog: &MetricsCatalog, metric: MetricKind) -> ModelRanking {
    let mut models: Vec<RankedModel> = catalog
        .iter()
        .map(|(model, metrics)| RankedModel {
            model: model.clone(),
            label: display_label(model),
            metrics: *metrics,
            best: false,
            worst: false,
        })
        .collect();

    models.sort_by(|a, b| {
        a.metrics
            .get(metric)
            .partial_cmp(&b.metrics.get(metric))
            .unwrap_or(Ordering::Equal)
    });

    if let Some(first) = models.first_mut() {
        first.best = true;
    }
    if let Some(last) = models.last_mut() {
        last.worst = true;
    }

    ModelRanking { metric, models }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ModelMetrics;

    fn catalog() -> MetricsCatalog {
        MetricsCatalog::from([
            ("xgboost".to_string(), ModelMetrics { mae: 0.06, rmse: 0.30, mape: 1.84 }),
            ("random_forest".to_string(), ModelMetrics { mae: 0.06, rmse: 0.60, mape: 2.44 }),
            ("prophet".to_string(), ModelMetrics { mae: 0.68, rmse: 0.76, mape: 37.02 }),
            ("lstm".to_string(), ModelMetrics { mae: 1.26, rmse: 2.00, mape: 67.30 }),
        ])
    }

    #[test]
    fn test_rank_by_rmse() {
        let ranking = rank_models(&catalog(), MetricKind::Rmse);
        let order: Vec<_> = ranking.models.iter().map(|m| m.model.as_str()).collect();
        assert_eq!(order, vec!["xgboost", "random_forest", "prophet", "lstm"]);
        assert!(ranking.models[0].best);
        assert!(ranking.models[3].worst);
        assert!(!ranking.models[1].best && !ranking.models[1].worst);
    }

    #[test]
    fn test_equal_scores_keep_catalog_order() {
        let ranking = rank_models(&catalog(), MetricKind::Mae);
        assert_eq!(ranking.models[0].model, "random_forest");
        assert_eq!(ranking.models[1].model, "xgboost");
    }

    #[test]
    fn test_single_model_is_best_and_worst() {
        let single = MetricsCatalog::from([(
            "lstm".to_string(),
            ModelMetrics { mae: 1.0, rmse: 1.0, mape: 1.0 },
        )]);
        let ranking = rank_models(&single, MetricKind::Mape);
        assert!(ranking.models[0].best && ranking.models[0].worst);
        assert!(rank_models(&MetricsCatalog::new(), MetricKind::Rmse).models.is_empty());
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("random_forest"), "RANDOM FOREST");
        assert_eq!(display_label("xgboost"), "XGBOOST");
    }
}
