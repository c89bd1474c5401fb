//! support-desk CLI
//!
//! Answers one customer support query from the command line, either through
//! an LLM provider (Ollama or an OpenAI-compatible endpoint) or offline with
//! the rule-based gateway.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use agent_runtime::{LlmProvider, ProviderKind, provider_from_env};
use support_desk::{
    AgentGateway, GatewayError, KnowledgeBase, LlmGateway, OfflineGateway, SupportQuery,
    SupportResponse, TriageError, handle_support_query,
};

/// Triage a technical support issue
#[derive(Parser, Debug)]
#[command(name = "support-desk", version, about)]
struct Args {
    /// Issue description
    #[arg(long, default_value = "Can't connect to database after restart")]
    issue: String,

    /// Reported severity (low, medium, high, critical)
    #[arg(long, default_value = "high")]
    severity: String,

    /// Product name, matched exactly against the knowledge base
    #[arg(long, default_value = "CloudDB")]
    product: String,

    #[arg(long, default_value = "user123")]
    user_id: String,

    /// LLM provider: ollama or openai
    #[arg(long, env = "SUPPORT_PROVIDER", default_value = "ollama")]
    provider: ProviderKind,

    /// Model name; defaults per provider
    #[arg(long, env = "SUPPORT_MODEL")]
    model: Option<String>,

    /// Maximum model round trips
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Answer with the rule-based gateway; no model is contacted
    #[arg(long)]
    offline: bool,

    /// JSON knowledge base to use instead of the built-in CloudDB one
    #[arg(long, value_name = "PATH")]
    knowledge_base: Option<PathBuf>,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries only the response
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let kb = match &args.knowledge_base {
        Some(path) => KnowledgeBase::load(path)
            .with_context(|| format!("loading knowledge base from {}", path.display()))?,
        None => KnowledgeBase::clouddb(),
    };
    let kb = Arc::new(kb);

    let gateway: Box<dyn AgentGateway> = if args.offline {
        tracing::info!("using offline gateway");
        Box::new(OfflineGateway::new(Arc::clone(&kb)))
    } else {
        Box::new(llm_gateway(&args).await?)
    };

    let query = SupportQuery::new(
        args.issue.as_str(),
        args.severity.as_str(),
        args.product.as_str(),
        args.user_id.as_str(),
        Utc::now(),
    );

    let response = match handle_support_query(&query, kb, &*gateway).await {
        Ok(response) => response,
        Err(err) => {
            if let Some(hint) = user_hint(&err) {
                eprintln!("{hint}");
            }
            return Err(anyhow::Error::new(err).context("support query failed"));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }

    Ok(())
}

async fn llm_gateway(args: &Args) -> anyhow::Result<LlmGateway> {
    let provider = provider_from_env(args.provider)
        .with_context(|| format!("configuring {} provider", args.provider))?;

    match provider.health_check().await {
        Ok(true) => tracing::info!(provider = %args.provider, "✓ provider reachable"),
        Ok(false) | Err(_) => {
            tracing::warn!(provider = %args.provider, "⚠ provider not reachable - query will likely fail");
            if args.provider == ProviderKind::Ollama {
                tracing::warn!("  Make sure Ollama is running: ollama serve");
            }
        }
    }

    let model = args
        .model
        .clone()
        .unwrap_or_else(|| args.provider.default_model().to_string());
    tracing::info!(%model, "using model");

    let mut gateway = LlmGateway::new(provider).model(model);
    if let Some(max) = args.max_iterations {
        gateway = gateway.max_iterations(max);
    }
    Ok(gateway)
}

/// Plain-language explanation for agent failures
fn user_hint(err: &TriageError) -> Option<String> {
    match err {
        TriageError::Gateway(GatewayError::Agent(agent)) => Some(agent.user_message()),
        TriageError::Gateway(GatewayError::Unavailable(_)) => {
            Some("The AI service is currently unavailable. Please try again.".into())
        }
        _ => None,
    }
}

fn print_response(response: &SupportResponse) {
    println!("Solution: {}", response.solution);
    println!("Next steps:");
    for (i, step) in response.next_steps.iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }
    println!("Escalate: {}", response.escalate);
    println!("Priority: {}", response.priority_level);
    println!("Estimated time: {}", response.estimated_time);
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_runtime::AgentError;

    #[test]
    fn test_defaults_match_sample_query() {
        let args = Args::try_parse_from(["support-desk", "--offline"]).unwrap();
        assert_eq!(args.issue, "Can't connect to database after restart");
        assert_eq!(args.severity, "high");
        assert_eq!(args.product, "CloudDB");
        assert_eq!(args.user_id, "user123");
        assert!(args.offline);
        assert!(!args.json);
    }

    #[test]
    fn test_provider_flag() {
        let args = Args::try_parse_from(["support-desk", "--provider", "groq", "--max-iterations", "4"])
            .unwrap();
        assert_eq!(args.provider, ProviderKind::OpenAi);
        assert_eq!(args.max_iterations, Some(4));

        assert!(Args::try_parse_from(["support-desk", "--provider", "bedrock"]).is_err());
    }

    #[test]
    fn test_user_hint() {
        let auth = TriageError::Gateway(GatewayError::Agent(AgentError::Auth("401".into())));
        assert_eq!(
            user_hint(&auth).unwrap(),
            "Authentication failed. Please check your API key."
        );

        let down = TriageError::Gateway(GatewayError::Unavailable("refused".into()));
        assert!(user_hint(&down).unwrap().contains("unavailable"));

        let kb = TriageError::KnowledgeBase("product name is empty".into());
        assert!(user_hint(&kb).is_none());
    }

    #[tokio::test]
    async fn test_offline_run() {
        let kb = Arc::new(KnowledgeBase::clouddb());
        let gateway = OfflineGateway::new(Arc::clone(&kb));
        let query = SupportQuery::new("Slow queries", "medium", "CloudDB", "user42", Utc::now());

        let response = handle_support_query(&query, kb, &gateway).await.unwrap();

        assert_eq!(response.solution, "Analyze query performance and optimize indexes");
        assert_eq!(response.priority_level, 2);
        assert!(!response.escalate);
    }
}
