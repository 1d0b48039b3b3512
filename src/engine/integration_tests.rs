// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::backends::script::{ComponentRegistry, ExecutionOptions, ScriptAdapter, ScriptLoader};
use crate::context::{ContentProvider, Dependency, DependencyCatalog, MapBroker};
use crate::engine::{Emitter, Evaluation, GraphBuilder, HookResult, RuleRunner, StreamNode};

/// Integration tests running loaded scripts through the runner and the dataflow graph
#[cfg(test)]
mod tests {
    use super::*;

    fn write_scripts(dir: &TempDir) {
        fs::write(
            dir.path().join("hostname_check.sh"),
            "#!/bin/sh\n# type: rule\n# requires: hostname\necho \"host: $(cat \"$hostname\")\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("needs_uptime.sh"),
            "#!/bin/sh\n# type: rule\n# requires: uptime\necho 'up: yes'\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("silent.sh"),
            "#!/bin/sh\n# type: rule\n# optional: hostname\nexit 0\n",
        )
        .unwrap();
    }

    fn loader(dir: &TempDir) -> ScriptLoader {
        let adapter = ScriptAdapter::new(
            DependencyCatalog::default(),
            Arc::new(ComponentRegistry::new()),
            ExecutionOptions::default(),
        );
        ScriptLoader::with_adapter(dir.path(), "scripts", adapter).expect("Failed to create loader")
    }

    fn broker() -> MapBroker {
        MapBroker::new().with(
            Dependency::new("specs", "hostname"),
            ContentProvider::from_content("/nonexistent/scriptwood/hostname", ["app07"]),
        )
    }

    #[tokio::test]
    async fn test_runner_evaluates_loaded_scripts() {
        let scripts = TempDir::new().unwrap();
        write_scripts(&scripts);

        let components = loader(&scripts).load_all();
        assert_eq!(components.len(), 3);

        let evaluations = RuleRunner::new().evaluate(&components, &broker()).await;

        assert_eq!(
            serde_json::to_value(&evaluations).unwrap(),
            serde_json::json!([
                {
                    "component": "scripts.hostname_check.report",
                    "status": "completed",
                    "outcome": {"host": "app07", "type": "rule"}
                },
                {
                    "component": "scripts.needs_uptime.report",
                    "status": "missing_requirements",
                    "missing": ["specs.uptime"]
                },
                {
                    "component": "scripts.silent.report",
                    "status": "completed",
                    "outcome": null
                }
            ])
        );
    }

    struct EvaluationSource {
        evaluations: Vec<Evaluation>,
    }

    #[async_trait]
    impl StreamNode<Evaluation> for EvaluationSource {
        async fn produce(&mut self, emitter: &Emitter<Evaluation>, _cancel: CancellationToken) -> HookResult {
            for evaluation in self.evaluations.drain(..) {
                emitter.emit(evaluation);
            }
            Ok(())
        }
    }

    struct Collector {
        completed_only: bool,
        names: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl StreamNode<Evaluation> for Collector {
        async fn update(&mut self, _origin: &str, payload: Arc<Evaluation>, _emitter: &Emitter<Evaluation>) -> HookResult {
            let keep = !self.completed_only || payload.outcome().map_or(false, |o| o.is_completed());
            if keep {
                self.names.lock().push(payload.component.clone());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_evaluations_stream_to_every_subscriber() {
        let scripts = TempDir::new().unwrap();
        write_scripts(&scripts);
        let components = loader(&scripts).load_all();
        let evaluations = RuleRunner::new().evaluate(&components, &broker()).await;

        let all = Arc::new(Mutex::new(Vec::new()));
        let completed = Arc::new(Mutex::new(Vec::new()));

        let mut builder = GraphBuilder::new();
        let source = builder
            .add_node("evaluations", EvaluationSource { evaluations }, &[])
            .unwrap();
        builder
            .add_node("all", Collector { completed_only: false, names: Arc::clone(&all) }, &[&source])
            .unwrap();
        builder
            .add_node("completed", Collector { completed_only: true, names: Arc::clone(&completed) }, &[&source])
            .unwrap();

        builder.build().start().wait().await;

        assert_eq!(
            *all.lock(),
            vec![
                "scripts.hostname_check.report",
                "scripts.needs_uptime.report",
                "scripts.silent.report",
            ]
        );
        assert_eq!(*completed.lock(), vec!["scripts.hostname_check.report"]);
    }
}
