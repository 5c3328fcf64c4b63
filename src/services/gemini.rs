// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini API client for the weight analysis feature.
//!
//! Handles:
//! - Prompt assembly from a cat profile and its weight history
//! - One-shot generateContent calls (no retry, no response caching)

use crate::error::AppError;
use crate::models::Gender;
use chrono::Datelike;
use serde::{Deserialize, Serialize};

const GEMINI_MODEL: &str = "gemini-2.5-flash";

/// A (date, weight) pair submitted for analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisWeight {
    /// Measurement date (RFC3339)
    pub date: String,
    /// Weight in kilograms
    pub weight: f64,
}

/// Cat profile as submitted by the analysis caller.
///
/// Field names stay camelCase on the wire; this is the same payload the
/// frontend chart dialog has always sent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisCatProfile {
    pub name: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub is_neutered: Option<bool>,
    #[serde(default)]
    pub target_weight: Option<f64>,
}

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client. The key may be absent; calls then fail
    /// with a configuration error.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key,
        }
    }

    /// Whether an API key was configured at startup.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send a prompt to the model and return the raw response text.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::GeminiApi("API key not configured".to_string()))?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, GEMINI_MODEL
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GeminiApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GeminiApi(format!("HTTP {}: {}", status, body)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::GeminiApi(format!("Invalid response JSON: {}", e)))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::GeminiApi("Empty model response".to_string()));
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Assemble the fixed Japanese analysis prompt from a cat profile and its
/// weight history.
///
/// Weights are listed oldest-first with `YYYY/M/D` dates, the way the
/// frontend has always displayed them.
pub fn build_analysis_prompt(cat: &AnalysisCatProfile, weights: &[AnalysisWeight]) -> String {
    let mut points: Vec<(chrono::DateTime<chrono::Utc>, f64)> = weights
        .iter()
        .filter_map(|w| {
            chrono::DateTime::parse_from_rfc3339(&w.date)
                .ok()
                .map(|d| (d.with_timezone(&chrono::Utc), w.weight))
        })
        .collect();
    points.sort_by_key(|(date, _)| *date);

    let weights_text = points
        .iter()
        .map(|(date, weight)| {
            format!(
                "{}/{}/{}: {}kg",
                date.year(),
                date.month(),
                date.day(),
                weight
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let gender = match cat.gender {
        Some(Gender::Male) => "オス",
        Some(Gender::Female) => "メス",
        None => "不明",
    };

    let age = cat
        .birth_date
        .as_deref()
        .and_then(birth_year)
        .map(|year| format!("{}歳", chrono::Utc::now().year() - year))
        .unwrap_or_else(|| "不明".to_string());

    let neutered = match cat.is_neutered {
        Some(true) => "済",
        Some(false) => "未",
        None => "不明",
    };

    let target = cat
        .target_weight
        .map(|t| format!("{}kg", t))
        .unwrap_or_else(|| "未設定".to_string());

    let cat_info = format!(
        "\n猫の名前: {}\n品種: {}\n性別: {}\n年齢: {}\n避妊去勢: {}\n目標体重: {}\n    ",
        cat.name,
        cat.breed.as_deref().unwrap_or("不明"),
        gender,
        age,
        neutered,
        target
    );

    format!(
        "あなたは猫の健康管理の専門家です。以下の猫の情報と体重データを分析し、健康状態と推奨事項を提供してください。

{cat_info}

体重記録:
{weights_text}

# 猫の健康に関する基礎知識

## 平均体重
- 大型猫種を除くと、オスでは4～5kg、メスでは3～4kgが平均的
- 小型猫は2～3.5kg、大型猫は4.5~9kg

## 体重の計り方
- 猫を抱っこしながら体重計に乗り、その後飼い主だけの体重を測って差し引く

## 体形チェックポイント
- お腹に脂肪がたまっていないか
- ウエストにくびれがあるか
- 背骨を感じられるか
- 肋骨を感じるか

## 太りやすい猫
- 去勢、避妊手術をした後は、体内の代謝が変わり太りやすくなる
- 中高齢を迎えると1日に必要なエネルギーが若いころと比べて低下するので、同じ量のご飯だと太ることも

# 分析項目

以下の観点から分析してください：
1. 体重の傾向（増加、減少、安定など）
2. 猫種、性別、年齢、避妊去勢状況を考慮した適正体重との比較
3. 体形チェックポイントに基づく評価
4. 避妊去勢後や中高齢猫の特性を考慮したアドバイス
5. 具体的な健康アドバイス（食事管理、運動など）
6. 目標体重が設定されている場合、その達成に向けた具体的なステップ

簡潔で分かりやすく、実用的なアドバイスを日本語でお願いします。"
    )
}

/// Extract the year from a `YYYY-MM-DD` birth date.
fn birth_year(birth_date: &str) -> Option<i32> {
    birth_date.split('-').next()?.parse().ok()
}
