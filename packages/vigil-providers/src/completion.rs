use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Sends a chat completion request and returns the first choice's content.
///
/// Transient failures (transport errors, unusable responses) are retried up
/// to `attempts` times; the last error is returned when every attempt fails.
pub async fn complete(
	cfg: &vigil_config::CompletionProviderConfig,
	prompt: &str,
	attempts: u32,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [
			{ "role": "user", "content": prompt }
		],
	});
	let mut last_error = None;

	for _ in 0..attempts.max(1) {
		let response = match client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await
			.and_then(|res| res.error_for_status())
		{
			Ok(response) => response,
			Err(err) => {
				last_error = Some(Error::Reqwest(err));

				continue;
			},
		};
		let json: Value = match response.json().await {
			Ok(json) => json,
			Err(err) => {
				last_error = Some(Error::Reqwest(err));

				continue;
			},
		};

		match parse_completion_response(json) {
			Ok(content) => return Ok(content),
			Err(err) => last_error = Some(err),
		}
	}

	Err(last_error.unwrap_or_else(|| Error::InvalidResponse {
		message: "Completion provider returned no usable response.".to_string(),
	}))
}

fn parse_completion_response(json: Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing choice content.".to_string(),
		})?;

	if content.trim().is_empty() {
		return Err(Error::InvalidResponse {
			message: "Completion response content is empty.".to_string(),
		});
	}

	Ok(content.to_string())
}
