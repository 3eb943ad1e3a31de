use crate::error::{Error, Result};
use crate::models::product::{normalize_product, NOT_FOUND};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value as JsonValue};
use std::time::Duration;

use crate::services::statement_service::StatementExtractor;

const MODEL: &str = "gpt-4o-mini";

const PRODUCT_PROMPT: &str = r#"Eres experto analizando finanzas.
Vas a extraer los datos de un cliente desde el texto de un estado de cuenta de tarjeta de crédito.

Toma solo las cuentas nacionales. No trabajas con cuentas internacionales ni con movimientos en dólares.

Identifica los datos del producto: nombre_titular, numero_tarjeta, fecha_estado_cuenta, fecha_pagar_hasta,
monto_total_facturado, monto_minimo_pagar, cupo_total, cupo_utilizado, cupo_disponible,
cupo_total_avance_efectivo, cupo_utilizado_avance_efectivo, cupo_disponible_avance_efectivo.

Si aplican, incluye tasas de interés y CAE: tasas_interes_vigente_rotativo, tasas_interes_vigente_compra_cuotas,
tasas_interes_vigente_avance_cuotas, cae_rotativo, cae_compra_cuotas, cae_avance_cuotas.

Los montos deben ser números sin separadores de miles ni símbolo de moneda.
Responde un objeto JSON con la forma {"producto": {"clave": "valor"}}, claves en minúsculas y sin espacios."#;

const INTEREST_PROMPT: &str = r#"Eres experto analizando finanzas.
Vas a extraer los cobros de intereses desde el texto de un estado de cuenta de tarjeta de crédito.
Toma solo las cuentas nacionales, sin movimientos en dólares.
Responde un objeto JSON con la forma {"intereses": {"clave": monto}}, claves en minúsculas y sin espacios."#;

#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: Option<String>,
}

impl AIService {
    pub fn new(api_key: Option<String>, client: Client) -> Self {
        Self { client, api_key }
    }

    pub async fn extract_product(&self, text: &str) -> Result<Map<String, JsonValue>> {
        let payload = serde_json::json!({
            "model": MODEL,
            "messages": [
                {"role": "system", "content": PRODUCT_PROMPT},
                {"role": "user", "content": text}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.2,
            "max_tokens": 800
        });

        let response = self.chat_openai(payload).await?;
        Ok(normalize_product(&product_fields(response)))
    }

    pub async fn extract_interest(&self, text: &str) -> Result<JsonValue> {
        let payload = serde_json::json!({
            "model": MODEL,
            "messages": [
                {"role": "system", "content": INTEREST_PROMPT},
                {"role": "user", "content": text}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.2,
            "max_tokens": 800
        });

        let response = self.chat_openai(payload).await?;
        Ok(response
            .get("intereses")
            .cloned()
            .unwrap_or_else(|| JsonValue::String(NOT_FOUND.to_string())))
    }

    async fn chat_openai(&self, payload: JsonValue) -> Result<JsonValue> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Internal("OPENAI_API_KEY is not configured".to_string()))?;

        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;
        parse_chat_content(&body)
    }
}

#[async_trait]
impl StatementExtractor for AIService {
    async fn extract_product(&self, text: &str) -> Result<Map<String, JsonValue>> {
        AIService::extract_product(self, text).await
    }

    async fn extract_interest(&self, text: &str) -> Result<Option<JsonValue>> {
        AIService::extract_interest(self, text).await.map(Some)
    }
}

/// Pulls the JSON object out of a chat completion body.
fn parse_chat_content(body: &JsonValue) -> Result<JsonValue> {
    body.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .and_then(|s| serde_json::from_str(s).ok())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response format").into())
}

fn product_fields(response: JsonValue) -> Map<String, JsonValue> {
    match response {
        JsonValue::Object(mut map) => match map.remove("producto") {
            Some(JsonValue::Object(inner)) => inner,
            Some(other) => {
                map.insert("producto".to_string(), other);
                map
            }
            None => map,
        },
        _ => Map::new(),
    }
}
