// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::context::{unsatisfied, RuleOutcome};
use crate::observability::messages::runner::{ComponentEvaluated, ComponentSkipped, EvaluationStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{Broker, Component};

/// What happened to one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// Not invoked; lists each unmet requirement.
    MissingRequirements { missing: Vec<String> },
    Completed { outcome: RuleOutcome },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub component: String,
    #[serde(flatten)]
    pub status: EvaluationStatus,
}

impl Evaluation {
    pub fn outcome(&self) -> Option<&RuleOutcome> {
        match &self.status {
            EvaluationStatus::Completed { outcome } => Some(outcome),
            EvaluationStatus::MissingRequirements { .. } => None,
        }
    }
}

/// Evaluates components one after another against a single broker.
///
/// A component is only invoked when every mandatory dependency resolves and
/// every alternation group has at least one member that resolves. Each
/// invocation is awaited before the next starts.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleRunner;

impl RuleRunner {
    pub fn new() -> Self {
        Self
    }

    pub async fn evaluate_one<C>(&self, component: &C, broker: &dyn Broker) -> Evaluation
    where
        C: Component + ?Sized,
    {
        let name = component.name().to_string();
        let missing: Vec<String> = unsatisfied(component.requires(), broker)
            .into_iter()
            .map(ToString::to_string)
            .collect();

        if !missing.is_empty() {
            ComponentSkipped {
                component: &name,
                missing: &missing,
            }
            .log();
            return Evaluation {
                component: name,
                status: EvaluationStatus::MissingRequirements { missing },
            };
        }

        let start_time = Instant::now();
        let outcome = component.invoke(broker).await;
        ComponentEvaluated {
            component: &name,
            completed: outcome.is_completed(),
            duration: start_time.elapsed(),
        }
        .log();

        Evaluation {
            component: name,
            status: EvaluationStatus::Completed { outcome },
        }
    }

    /// Evaluate `components` in order.
    pub async fn evaluate<C>(&self, components: &[Arc<C>], broker: &dyn Broker) -> Vec<Evaluation>
    where
        C: Component + ?Sized,
    {
        let started = EvaluationStarted {
            component_count: components.len(),
        };
        started.log();

        async {
            let mut evaluations = Vec::with_capacity(components.len());
            for component in components {
                evaluations.push(self.evaluate_one(&**component, broker).await);
            }
            evaluations
        }
        .instrument(started.span("evaluate"))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContentProvider, Dependency, MapBroker, Requirement};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedComponent {
        name: String,
        requires: Vec<Requirement>,
        calls: AtomicUsize,
    }

    impl FixedComponent {
        fn new(name: &str, requires: Vec<Requirement>) -> Self {
            Self {
                name: name.to_string(),
                requires,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Component for FixedComponent {
        fn name(&self) -> &str {
            &self.name
        }

        fn requires(&self) -> &[Requirement] {
            &self.requires
        }

        fn optional(&self) -> &[Dependency] {
            &[]
        }

        async fn invoke(&self, _broker: &dyn Broker) -> RuleOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut fields = serde_json::Map::new();
            fields.insert("error_key".to_string(), json!("FIXED"));
            RuleOutcome::completed(fields)
        }
    }

    fn spec(name: &str) -> Dependency {
        Dependency::new("specs", name)
    }

    fn broker_with(names: &[&str]) -> MapBroker {
        names.iter().fold(MapBroker::new(), |broker, name| {
            broker.with(spec(name), ContentProvider::from_content("", ["x"]))
        })
    }

    #[tokio::test]
    async fn test_unmet_requirements_skip_invocation() {
        let component = FixedComponent::new(
            "needs_both",
            vec![
                Requirement::One(spec("hostname")),
                Requirement::AnyOf(vec![spec("ps_aux"), spec("ps_ef")]),
            ],
        );

        let evaluation = RuleRunner::new().evaluate_one(&component, &broker_with(&["hostname"])).await;

        assert_eq!(component.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            evaluation.status,
            EvaluationStatus::MissingRequirements {
                missing: vec!["any of [specs.ps_aux, specs.ps_ef]".to_string()]
            }
        );
        assert!(evaluation.outcome().is_none());
    }

    #[tokio::test]
    async fn test_one_alternative_is_enough() {
        let component = FixedComponent::new(
            "either",
            vec![Requirement::AnyOf(vec![spec("ps_aux"), spec("ps_ef")])],
        );

        let evaluation = RuleRunner::new().evaluate_one(&component, &broker_with(&["ps_ef"])).await;

        assert_eq!(component.calls.load(Ordering::SeqCst), 1);
        assert!(evaluation.outcome().map_or(false, RuleOutcome::is_completed));
    }

    #[tokio::test]
    async fn test_evaluate_keeps_order_and_serializes() {
        let components: Vec<Arc<dyn Component>> = vec![
            Arc::new(FixedComponent::new("first", vec![])),
            Arc::new(FixedComponent::new("second", vec![Requirement::One(spec("uptime"))])),
        ];

        let evaluations = RuleRunner::new().evaluate(&components, &MapBroker::new()).await;

        assert_eq!(
            serde_json::to_value(&evaluations).unwrap(),
            json!([
                {
                    "component": "first",
                    "status": "completed",
                    "outcome": {"error_key": "FIXED", "type": "rule"}
                },
                {
                    "component": "second",
                    "status": "missing_requirements",
                    "missing": ["specs.uptime"]
                }
            ])
        );
    }
}
