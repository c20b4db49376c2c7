use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{
    GuideflowError, Message, Result,
    dialog::actions::{Action, ActionType},
    runtime::ActionContext,
};

use super::{
    models::{HttpRequestMethod, Separator, SummarizeField},
    summarize::summarize_bytes,
};

fn default_timeout() -> u64 {
    10_000
}

/// Calls an HTTP endpoint and answers with a summary of its JSON response.
///
/// Without `fields` the raw response body becomes the reply.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HttpRequestAction {
    url: String,
    #[serde(default)]
    method: HttpRequestMethod,
    #[serde(default)]
    headers: HashMap<String, String>,
    #[serde(default)]
    params: HashMap<String, String>,
    #[serde(default)]
    body: Option<JsonValue>,
    #[serde(default = "default_timeout")]
    timeout_ms: u64,
    #[serde(default)]
    fields: Vec<SummarizeField>,
    #[serde(default)]
    separator: Separator,
}

impl HttpRequestAction {
    pub fn new(
        method: HttpRequestMethod,
        url: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            params: HashMap::new(),
            body: None,
            timeout_ms: default_timeout(),
            fields: Vec::new(),
            separator: Separator::default(),
        }
    }

    pub fn with_fields(
        mut self,
        fields: Vec<SummarizeField>,
        separator: Separator,
    ) -> Self {
        self.fields = fields;
        self.separator = separator;
        self
    }

    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    fn build_request(&self) -> Result<reqwest::RequestBuilder> {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("accept"), HeaderValue::from_static("application/json"));
        for (key, value) in &self.headers {
            headers.insert(
                key.parse::<HeaderName>().map_err(|err| GuideflowError::Action(err.to_string()))?,
                value.parse().map_err(|err: InvalidHeaderValue| GuideflowError::Action(err.to_string()))?,
            );
        }

        let method = self.method.as_ref().parse::<reqwest::Method>().map_err(|_| GuideflowError::Action(format!("invalid method '{:?}'", self.method)))?;

        let mut request = reqwest::Client::new().request(method, &self.url).headers(headers).query(&self.params);
        if let Some(body) = &self.body {
            request = request.json(body);
        }

        Ok(request.timeout(Duration::from_millis(self.timeout_ms)))
    }
}

#[async_trait]
#[typetag::serde(name = "http_request")]
impl Action for HttpRequestAction {
    fn action_type(&self) -> ActionType {
        ActionType::HttpRequest
    }

    async fn run(
        &self,
        _: &ActionContext,
        message: &mut Message,
    ) -> Result<()> {
        let res = self.build_request()?.send().await.map_err(|err| GuideflowError::Action(format!("Http error: {}", err)))?;

        let status = res.status();
        if !status.is_success() {
            return Err(GuideflowError::Action(format!("Http status {} from {}", status.as_u16(), self.url)));
        }

        let body = res.bytes().await.map_err(|err| GuideflowError::Action(err.to_string()))?;
        message.output = if self.fields.is_empty() {
            String::from_utf8_lossy(&body).into_owned()
        } else {
            summarize_bytes(&body, &self.fields, &self.separator).map_err(|err| GuideflowError::Action(format!("invalid response body: {}", err)))?
        };

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::HttpRequestAction;
    use crate::{
        GuideflowError, Message,
        common::Shutdown,
        dialog::actions::{Action, ActionType},
        runtime::ActionContext,
    };

    #[test]
    fn test_http_request_from_json() {
        let action: Box<dyn Action> = serde_json::from_str(
            r#"{
                "type": "http_request",
                "url": "http://localhost:8080/invoices",
                "fields": [{ "name": "Due", "path": "invoices.#.due" }],
                "separator": " = "
            }"#,
        )
        .unwrap();
        assert_eq!(action.action_type(), ActionType::HttpRequest);
    }

    #[test]
    fn test_http_request_timeout_ms() {
        let action: HttpRequestAction = serde_json::from_str(r#"{ "url": "http://localhost:8080/invoices", "timeout_ms": 250 }"#).unwrap();
        let request = action.build_request().unwrap().build().unwrap();
        assert_eq!(request.timeout(), Some(&Duration::from_millis(250)));

        let action: HttpRequestAction = serde_json::from_str(r#"{ "url": "http://localhost:8080/invoices" }"#).unwrap();
        let request = action.build_request().unwrap().build().unwrap();
        assert_eq!(request.timeout(), Some(&Duration::from_secs(10)));
    }

    #[test]
    fn test_http_request_rejects_bad_header() {
        let action = HttpRequestAction::new(Default::default(), "http://localhost").with_header("bad header", "x");
        let err = action.build_request().unwrap_err();
        assert!(matches!(err, GuideflowError::Action(_)));
    }

    #[tokio::test]
    async fn test_http_request_transport_error() {
        // nothing listens on the discard port
        let action = HttpRequestAction::new(Default::default(), "http://127.0.0.1:9/");
        let ctx = ActionContext::new("r1".into(), "wf".into(), "n".into(), "s".into(), Shutdown::new());
        let mut msg = Message::new("s", "n");

        let err = action.run(&ctx, &mut msg).await.unwrap_err();
        assert!(matches!(err, GuideflowError::Action(_)));
        assert!(msg.output.is_empty());
    }
}
