//! Subcommand implementations. Each one loads what it needs from the
//! service, reuses the engine to shape requests and prints plain text.

use anyhow::{Context, Result, bail, ensure};
use senpy_api::{PluginQuery, SenpyClient};
use senpy_engine::request::strip_reserved;
use senpy_engine::result::service_message;
use senpy_engine::{
    Action, AnalysisRequest, EvaluationRequest, ResultView, SessionState, TripleGraph, describe, metric_headers,
    metric_rows, parse_evaluations, reduce, route_response,
};
use senpy_types::{OutFormat, ServiceResponse};
use tracing::{debug, warn};

use crate::AnalyseArgs;
use crate::output;

pub async fn plugins(client: &SenpyClient, json: bool) -> Result<()> {
    let plugins = client.plugins(&PluginQuery::verbose()).await.context("listing plugins")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&plugins)?);
        return Ok(());
    }
    print!("{}", output::plugin_listing(&plugins));
    Ok(())
}

pub async fn datasets(client: &SenpyClient) -> Result<()> {
    let datasets = client.datasets().await.context("listing datasets")?;
    if datasets.is_empty() {
        println!("The service lists no datasets.");
    }
    for dataset in datasets {
        println!("{}", dataset.id);
    }
    Ok(())
}

pub async fn params(client: &SenpyClient, plugin: Option<&str>) -> Result<()> {
    let schema = match plugin {
        Some(name) => client
            .plugin_parameters(name, Some(true))
            .await
            .with_context(|| format!("loading parameters of '{name}'"))?,
        None => strip_reserved(&client.basic_parameters().await.context("loading basic parameters")?),
    };
    print!("{}", output::form_listing(&describe(&schema)));
    Ok(())
}

pub async fn analyse(client: &SenpyClient, args: &AnalyseArgs, outformat: OutFormat) -> Result<()> {
    let session = load_session(client, outformat).await?;
    let request = plan_analysis(session, args)?;
    let url = request.url(client.base_url());
    if args.dry_run {
        println!("{url}");
        return Ok(());
    }

    let response = send(client, &url).await?;
    match route_response(&response.body) {
        ResultView::Structured(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        ResultView::Raw(text) => println!("{text}"),
    }
    Ok(())
}

pub async fn graph(client: &SenpyClient, args: &AnalyseArgs, nodes: bool) -> Result<()> {
    let session = load_session(client, OutFormat::NTriples).await?;
    let request = plan_analysis(session, args)?;
    let url = request.url(client.base_url());
    if args.dry_run {
        println!("{url}");
        return Ok(());
    }

    let response = send(client, &url).await?;
    let graph = TripleGraph::from_ntriples(&response.body);
    if graph.is_empty() {
        bail!("the service returned no triples");
    }
    let rendered = if nodes {
        serde_json::to_string_pretty(&graph)?
    } else {
        serde_json::to_string_pretty(&graph.adjacency())?
    };
    println!("{rendered}");
    Ok(())
}

pub async fn evaluate(client: &SenpyClient, plugin: Option<&str>, datasets: Vec<String>, dry_run: bool) -> Result<()> {
    let algo = match plugin {
        Some(name) => name.to_string(),
        None => client.default_plugin().await.context("loading the default plugin")?.name,
    };
    let request = EvaluationRequest::new(Some(&algo), datasets)?;
    let url = request.url(client.base_url());
    if dry_run {
        println!("{url}");
        return Ok(());
    }

    let response = send(client, &url).await?;
    let evaluations = parse_evaluations(&response.body).context("reading the evaluation response")?;
    print!("{}", output::metrics_table(&metric_headers(&evaluations), &metric_rows(&evaluations)));
    Ok(())
}

async fn load_session(client: &SenpyClient, outformat: OutFormat) -> Result<SessionState> {
    let snapshot = client.catalog().await.context("loading the plugin catalog")?;
    Ok(reduce(
        SessionState::new(client.base_url(), outformat),
        Action::CatalogLoaded(Box::new(snapshot)),
    ))
}

/// The request the TUI form would send for `args`, with `--param`
/// values layered over the form defaults.
pub fn plan_analysis(mut session: SessionState, args: &AnalyseArgs) -> Result<AnalysisRequest> {
    if let Some(name) = args.plugin.as_deref() {
        ensure!(session.catalog.get(name).is_some(), "unknown plugin '{name}'");
        ensure!(session.catalog.is_selectable(name), "plugin '{name}' is not activated");
        session = reduce(session, Action::SelectPlugin(name.to_string()));
    }
    for stage in &args.stages {
        if session.catalog.get(stage).is_none() {
            warn!(%stage, "stage is not in the plugin catalog; sending it anyway");
        }
        session = reduce(session, Action::AddStage(stage.clone()));
    }
    session = reduce(session, Action::SetInput(args.input.clone()));

    let base = session.analysis_request().context("no activated plugin is available")?;
    let mut parameters = base.parameters;
    for (name, value) in &args.params {
        parameters.insert(name.clone(), value.clone());
    }
    debug!(algo = %base.algo, "planned analysis");
    Ok(AnalysisRequest::new(base.algo, base.input, base.outformat, parameters))
}

/// GET `url`; a non-2xx answer becomes an error carrying the service message.
async fn send(client: &SenpyClient, url: &str) -> Result<ServiceResponse> {
    let response = client.fetch(url).await.with_context(|| format!("requesting {url}"))?;
    if !response.is_success() {
        let message = service_message(&response.body).unwrap_or_else(|| response.body.clone());
        bail!("the service answered HTTP {}: {message}", response.status_code);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use senpy_types::{CatalogSnapshot, Plugin};
    use serde_json::json;

    fn session() -> SessionState {
        let plugins: Vec<Plugin> = serde_json::from_value(json!([
            {
                "name": "sentiment140",
                "@type": "sentimentPlugin",
                "is_activated": true,
                "extra_params": { "language": { "options": ["en", "es"], "default": "en" } }
            },
            {
                "name": "split",
                "@type": "analysisPlugin",
                "is_activated": true,
                "extra_params": { "delimiter": { "options": ["sentence", "paragraph"], "default": "sentence" } }
            },
            { "name": "vader", "@type": "sentimentPlugin", "is_activated": false }
        ]))
        .unwrap();
        let snapshot = CatalogSnapshot {
            plugins,
            ..Default::default()
        };
        reduce(
            SessionState::new("http://localhost:5000", OutFormat::JsonLd),
            Action::CatalogLoaded(Box::new(snapshot)),
        )
    }

    fn args(input: &str) -> AnalyseArgs {
        AnalyseArgs {
            input: input.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_come_from_the_catalog_and_form() {
        let request = plan_analysis(session(), &args("hello")).unwrap();
        assert_eq!(
            request.url("http://localhost:5000"),
            "http://localhost:5000/api?algo=sentiment140&i=hello&outformat=json-ld&language=en"
        );
    }

    #[test]
    fn stages_and_overrides_shape_the_request() {
        let mut args = args("hola");
        args.stages = vec!["split".into()];
        args.params = vec![("language".into(), "es".into()), ("outformat".into(), "turtle".into())];
        let request = plan_analysis(session(), &args).unwrap();
        assert_eq!(request.algo, "split,sentiment140");
        assert_eq!(request.parameters.get("language").map(String::as_str), Some("es"));
        assert_eq!(request.parameters.get("delimiter").map(String::as_str), Some("sentence"));
        assert!(!request.parameters.contains_key("outformat"));
    }

    #[test]
    fn unavailable_plugins_are_rejected() {
        let mut inactive = args("x");
        inactive.plugin = Some("vader".into());
        assert!(plan_analysis(session(), &inactive).unwrap_err().to_string().contains("not activated"));

        let mut unknown = args("x");
        unknown.plugin = Some("nope".into());
        assert!(plan_analysis(session(), &unknown).unwrap_err().to_string().contains("unknown plugin"));
    }

    #[test]
    fn stages_missing_from_the_catalog_are_still_sent() {
        let mut args = args("x");
        args.stages = vec!["remote-only".into()];
        let request = plan_analysis(session(), &args).unwrap();
        assert_eq!(request.algo, "remote-only,sentiment140");
        assert_eq!(request.parameters.get("language").map(String::as_str), Some("en"));
    }
}
