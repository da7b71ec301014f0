use std::{fmt::Debug, fmt::Write as _, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{truncate_body, ProviderError};
use crate::models::{CostEstimate, Leg, WeatherCoverage, WeatherReport};

pub const GROQ_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(15);
const TEMPERATURE: f32 = 0.5;

const SYSTEM_PROMPT: &str =
    "Você é um assistente de viagem especializado em criar relatórios detalhados e acolhedores.";

const TRAVEL_TIPS: &str = "## Dicas de Viagem ##\n\
- Revise pneus, óleo e freios antes de sair.\n\
- Leve água e faça pausas a cada duas horas de direção.\n\
- Confira a previsão do tempo novamente no dia da viagem.\n";

/// Chat-style text generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    http: Client,
    api_key: String,
    url: String,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(api_key: String, url: String, model: String) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(COMPLETION_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key,
            url,
            model,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let payload = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
        };

        let res = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        parse_completion(&body)
    }
}

pub fn parse_completion(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatResponse = serde_json::from_str(body)?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ProviderError::MissingField("choices[0].message.content"))
}

/// Deterministic trip summary used both as the prompt and as the fallback text.
pub fn build_summary(
    leg: &Leg,
    reports: &[WeatherReport],
    coverage: WeatherCoverage,
    costs: Option<&CostEstimate>,
) -> String {
    let mut summary = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        summary,
        "## Resumo da Viagem ##\n\
         **Origem:** {}\n\
         **Destino:** {}\n\
         **Distância:** {}\n\
         **Duração estimada:** {}\n\n",
        leg.start_address, leg.end_address, leg.distance.text, leg.duration.text
    );

    if reports.is_empty() {
        summary.push_str("⚠️ Não foi possível obter dados meteorológicos para esta rota.\n");
    } else {
        summary.push_str("## Previsão do Tempo nas Principais Paradas ##\n");
        for report in reports {
            let _ = writeln!(
                summary,
                "- {}: {}, {}°C",
                report.city, report.description, report.temperature
            );
        }
        if coverage.missing() > 0 {
            let _ = writeln!(
                summary,
                "(Sem dados meteorológicos para {} de {} pontos consultados.)",
                coverage.missing(),
                coverage.requested
            );
        }
    }

    if let Some(costs) = costs {
        let _ = write!(
            summary,
            "\n## Estimativa de Custos ##\n\
             - Combustível: R$ {:.2}{}\n\
             - Água ({} parada(s)): R$ {:.2}\n\
             - Alimentação ({} parada(s)): R$ {:.2}\n\
             - **Total:** R$ {:.2}\n",
            costs.fuel,
            if costs.heat_surcharge_applied {
                " (inclui +10% por calor)"
            } else {
                ""
            },
            costs.stops,
            costs.water,
            costs.stops,
            costs.food,
            costs.total
        );
    }

    summary
}

fn user_prompt(summary: &str) -> String {
    format!("Transforme estes dados técnicos em um guia de viagem completo:\n\n{summary}")
}

/// Ask the generator for a travel guide; fall back to the summary on failure.
pub async fn narrate(generator: &dyn TextGenerator, summary: &str) -> String {
    match generator.complete(SYSTEM_PROMPT, &user_prompt(summary)).await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("text generation failed, returning plain summary: {err}");
            fallback_narrative(summary, &err)
        }
    }
}

pub fn fallback_narrative(summary: &str, err: &ProviderError) -> String {
    format!("{summary}\n{TRAVEL_TIPS}\n[Erro na geração do relatório: {err}]")
}
