//! Request shapes of the resource APIs against a mock Zenith server.
//!
//! Every mock matches on method, path and the query or body the server
//! expects, so a wrong route or payload surfaces as a 404 from wiremock.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zenith_client::{
    AgentStatus, CreateModelVersionRequest, CreatePromptVersionRequest, CreateRunRequest,
    MemoryStorage, MetricLog, MetricsWindow, ModelStage, ParameterLog, RunStatus,
    UpdateRunRequest, User, ZenithClient,
};

/// Client holding an established session with token `tok123`.
fn signed_in(server: &MockServer) -> ZenithClient {
    let client = ZenithClient::builder()
        .base_url(server.uri())
        .storage(Arc::new(MemoryStorage::new()))
        .build()
        .unwrap();
    client
        .store()
        .establish(User::new(1, "alice", "alice@example.com"), "tok123")
        .unwrap();
    client
}

fn run_json(status: &str) -> serde_json::Value {
    json!({"id": 11, "experiment_id": 4, "run_name": "baseline", "status": status})
}

// ─────────────────────────────────────────────────────────────────────────────
// Experiments
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_experiment_runs_lifecycle() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/experiments/runs"))
        .and(header("authorization", "Bearer tok123"))
        .and(body_json(json!({"experiment_id": 4, "run_name": "baseline"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_json("running")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/experiments/runs/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_json("running")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/experiments/runs/11"))
        .and(body_json(json!({"status": "completed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_json("completed")))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server);
    let experiments = client.experiments();

    let run = experiments
        .create_run(CreateRunRequest {
            experiment_id: 4,
            run_name: Some("baseline".into()),
            metadata: None,
            tags: None,
        })
        .await?;
    assert_eq!(run.status, RunStatus::Running);

    assert_eq!(experiments.get_run(11).await?.id, 11);

    let updated = experiments
        .update_run(
            11,
            UpdateRunRequest {
                status: Some(RunStatus::Completed),
                metadata: None,
            },
        )
        .await?;
    assert_eq!(updated.status, RunStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn test_run_metrics_and_parameters() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/experiments/runs/11/metrics"))
        .and(body_json(json!([
            {"key": "loss", "value": 0.25, "step": 1},
            {"key": "loss", "value": 0.125, "step": 2}
        ])))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "success", "count": 2})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/experiments/runs/11/parameters"))
        .and(body_json(json!([{"key": "lr", "value": "0.01"}])))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "success", "count": 1})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/experiments/runs/11/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "run_id": 11, "key": "loss", "value": 0.25, "step": 1},
            {"id": 2, "run_id": 11, "key": "loss", "value": 0.125, "step": 2}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server);
    let experiments = client.experiments();

    let logged = experiments
        .log_metrics(
            11,
            &[
                MetricLog {
                    key: "loss".into(),
                    value: 0.25,
                    step: 1,
                },
                MetricLog {
                    key: "loss".into(),
                    value: 0.125,
                    step: 2,
                },
            ],
        )
        .await?;
    assert_eq!(logged.count, 2);

    let logged = experiments
        .log_parameters(
            11,
            &[ParameterLog {
                key: "lr".into(),
                value: "0.01".into(),
            }],
        )
        .await?;
    assert_eq!(logged.count, 1);

    let metrics = experiments.get_metrics(11).await?;
    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[1].step, 2);
    Ok(())
}

#[tokio::test]
async fn test_experiments_filtered_by_project() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/experiments"))
        .and(query_param("project_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 4, "name": "churn-baseline", "project_id": 7}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let experiments = signed_in(&server).experiments().list(7).await?;
    assert_eq!(experiments[0].project_id, 7);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Models
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_model_versions_and_promotion() -> Result<()> {
    let server = MockServer::start().await;
    let version = json!({
        "id": 9, "model_id": 2, "version": "1.0.0", "stage": "staging",
        "storage_path": "s3://models/churn/1.0.0", "framework": "sklearn"
    });
    Mock::given(method("POST"))
        .and(path("/api/v1/models/versions"))
        .and(body_json(json!({
            "model_id": 2, "version": "1.0.0", "run_id": 11,
            "storage_path": "s3://models/churn/1.0.0", "framework": "sklearn"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(version.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models/2/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([version])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/models/versions/9/promote"))
        .and(body_json(json!({"stage": "production"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"status": "success", "message": "Model promoted to production"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server);
    let models = client.models();

    let created = models
        .create_version(CreateModelVersionRequest {
            model_id: 2,
            version: "1.0.0".into(),
            run_id: Some(11),
            storage_path: "s3://models/churn/1.0.0".into(),
            framework: Some("sklearn".into()),
            metadata: None,
        })
        .await?;
    assert_eq!(created.stage, ModelStage::Staging);

    assert_eq!(models.list_versions(2).await?.len(), 1);

    let promoted = models.promote_version(9, ModelStage::Production).await?;
    assert_eq!(promoted.status, "success");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Deployments
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_deployment_predict_and_delete() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/deployments/5/predict"))
        .and(body_json(json!({"features": [1.0, 2.5]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prediction": 0.82})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/deployments/5"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server);

    let prediction = client
        .deployments()
        .predict(5, &json!({"features": [1.0, 2.5]}))
        .await?;
    assert_eq!(prediction["prediction"], 0.82);

    client.deployments().delete(5).await?;
    assert!(client.store().is_authenticated());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Monitoring
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_metrics_window_sent_as_query() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/monitoring/deployments/5/metrics"))
        .and(query_param("start_time", "2026-01-01T00:00:00Z"))
        .and(query_param_is_missing("end_time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_count": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let report = signed_in(&server)
        .monitoring()
        .metrics(
            5,
            MetricsWindow {
                start_time: Some("2026-01-01T00:00:00Z".into()),
                end_time: None,
            },
        )
        .await?;
    assert_eq!(report["request_count"], 42);
    Ok(())
}

#[tokio::test]
async fn test_drift_and_traces() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/monitoring/deployments/5/drift"))
        .and(body_json(json!({
            "reference_data": {"age": [30, 40]},
            "current_data": {"age": [55, 60]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"drift_detected": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/monitoring/deployments/5/traces"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"trace_id": "t-1"}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/monitoring/deployments/6/traces"))
        .and(query_param_is_missing("limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server);
    let monitoring = client.monitoring();

    let drift = monitoring
        .check_drift(5, &json!({"age": [30, 40]}), &json!({"age": [55, 60]}))
        .await?;
    assert_eq!(drift["drift_detected"], true);

    let traces = monitoring.traces(5, Some(20)).await?;
    assert_eq!(traces[0]["trace_id"], "t-1");

    let none = monitoring.traces(6, None).await?;
    assert_eq!(none, json!([]));
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Agents
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_agent_execution() -> Result<()> {
    let server = MockServer::start().await;
    let execution = json!({
        "id": 30, "agent_id": 8, "status": "completed",
        "input_data": {"question": "status?"}, "output_data": {"answer": "green"}
    });
    Mock::given(method("POST"))
        .and(path("/api/v1/agents/8/execute"))
        .and(body_json(json!({"question": "status?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(execution.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/agents/8/executions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([execution])))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server);
    let agents = client.agents();

    let run = agents.execute(8, &json!({"question": "status?"})).await?;
    assert_eq!(run.status, AgentStatus::Completed);
    assert_eq!(run.output_data, Some(json!({"answer": "green"})));

    let history = agents.list_executions(8).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].agent_id, 8);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Prompts
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_prompt_versions_and_render() -> Result<()> {
    let server = MockServer::start().await;
    let version = json!({
        "id": 40, "template_id": 12, "version": "v1",
        "template_text": "Hello {name}", "variables": ["name"]
    });
    Mock::given(method("POST"))
        .and(path("/api/v1/prompts/12/versions"))
        .and(body_json(json!({
            "version": "v1", "template_text": "Hello {name}", "variables": ["name"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(version.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/prompts/12/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([version])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/prompts/12/test"))
        .and(body_json(json!({"version": "v1", "variables": {"name": "Ada"}})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"rendered_prompt": "Hello Ada"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server);
    let prompts = client.prompts();

    let created = prompts
        .create_version(
            12,
            CreatePromptVersionRequest {
                version: "v1".into(),
                template_text: "Hello {name}".into(),
                variables: vec!["name".into()],
                model_config: None,
            },
        )
        .await?;
    assert_eq!(created.variables, vec!["name".to_string()]);

    assert_eq!(prompts.list_versions(12).await?[0].id, 40);

    let variables = HashMap::from([("name".to_string(), json!("Ada"))]);
    let rendered = prompts.test(12, "v1", &variables).await?;
    assert_eq!(rendered.rendered_prompt, "Hello Ada");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Datasets
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_datasets_list_and_get() -> Result<()> {
    let server = MockServer::start().await;
    let dataset = json!({"id": 21, "name": "customers", "project_id": 7, "version": "1"});
    Mock::given(method("GET"))
        .and(path("/api/v1/datasets"))
        .and(query_param("project_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([dataset.clone()])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/datasets/21"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dataset))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in(&server);

    let listed = client.datasets().list(7).await?;
    assert_eq!(listed[0].name, "customers");
    assert_eq!(client.datasets().get(21).await?, listed[0]);
    Ok(())
}
